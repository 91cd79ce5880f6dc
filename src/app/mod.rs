use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use eframe::egui::Context;
use tracing::{info, warn};

use crate::data::{CycleAlert, GraphQuery, GraphSnapshot, NodeKind};

mod filter;
mod highlight;
mod interaction;
mod layout;
mod render_utils;
mod ui;
mod view;

use filter::{TableSort, TypeFilter};
use interaction::{Camera, InteractionState};
use layout::{LayoutEngine, SimulationParams};

pub struct TradeGraphApp {
    model: ViewModel,
}

impl TradeGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        query: Arc<dyn GraphQuery>,
        default_limit: usize,
    ) -> Self {
        let mut model = ViewModel::new(query, default_limit);
        model.request_full_load();
        model.request_cycle_scan();
        Self { model }
    }
}

impl eframe::App for TradeGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.model.poll_pending();
        self.model.poll_cycles();
        self.model.show(ctx);

        if self.model.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(80));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueryKind {
    FullLoad,
    Search,
    HubFocus,
}

struct PendingQuery {
    generation: u64,
    kind: QueryKind,
    rx: Receiver<Result<GraphSnapshot>>,
}

struct ViewModel {
    query: Arc<dyn GraphQuery>,
    default_limit: usize,

    snapshot: GraphSnapshot,
    has_loaded_once: bool,
    layout: LayoutEngine,
    interaction: InteractionState,
    camera: Camera,
    type_filter: TypeFilter,

    search_input: String,
    table_sort: TableSort,
    table_filter: String,
    show_table: bool,

    status_line: Option<String>,
    generation: u64,
    pending: Option<PendingQuery>,
    fit_camera_pending: bool,

    cycles: Vec<CycleAlert>,
    cycles_rx: Option<Receiver<Result<Vec<CycleAlert>>>>,
}

impl ViewModel {
    fn new(query: Arc<dyn GraphQuery>, default_limit: usize) -> Self {
        Self {
            query,
            default_limit,
            snapshot: GraphSnapshot::default(),
            has_loaded_once: false,
            layout: LayoutEngine::new(SimulationParams::default()),
            interaction: InteractionState::default(),
            camera: Camera::default(),
            type_filter: TypeFilter::default(),
            search_input: String::new(),
            table_sort: TableSort::default(),
            table_filter: String::new(),
            show_table: false,
            status_line: None,
            generation: 0,
            pending: None,
            fit_camera_pending: false,
            cycles: Vec::new(),
            cycles_rx: None,
        }
    }

    fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Issues a query on a worker thread. Each request captures the next
    /// generation; only the resolution matching the latest issued
    /// generation is ever applied.
    fn issue_query<F>(&mut self, kind: QueryKind, run: F)
    where
        F: FnOnce(&dyn GraphQuery) -> Result<GraphSnapshot> + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        let query = Arc::clone(&self.query);
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(run(query.as_ref()));
        });

        self.pending = Some(PendingQuery {
            generation,
            kind,
            rx,
        });
    }

    pub(in crate::app) fn request_full_load(&mut self) {
        let limit = self.default_limit;
        self.issue_query(QueryKind::FullLoad, move |query| query.load_default(limit));
    }

    pub(in crate::app) fn request_search(&mut self) {
        let text = self.search_input.trim().to_owned();
        if text.is_empty() {
            self.request_full_load();
            return;
        }
        self.issue_query(QueryKind::Search, move |query| query.search(&text));
    }

    pub(in crate::app) fn request_hub_focus(&mut self, entity_id: String) {
        self.issue_query(QueryKind::HubFocus, move |query| {
            query.entity_neighborhood(&entity_id)
        });
    }

    pub(in crate::app) fn request_cycle_scan(&mut self) {
        let query = Arc::clone(&self.query);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(query.detect_cycles());
        });
        self.cycles_rx = Some(rx);
    }

    fn poll_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        match pending.rx.try_recv() {
            Ok(result) => self.apply_resolution(pending.generation, pending.kind, result),
            Err(TryRecvError::Empty) => self.pending = Some(pending),
            Err(TryRecvError::Disconnected) => {
                warn!("graph query worker vanished without a result");
                self.status_line = Some("Query worker failed".to_owned());
            }
        }
    }

    fn poll_cycles(&mut self) {
        let Some(rx) = self.cycles_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(cycles)) => {
                info!(count = cycles.len(), "circular trade scan finished");
                self.cycles = cycles;
            }
            Ok(Err(error)) => warn!(%error, "circular trade scan failed"),
            Err(TryRecvError::Empty) => self.cycles_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                warn!("circular trade worker vanished without a result");
            }
        }
    }

    /// The single place a query resolution touches state. Stale
    /// generations are discarded wholesale; failures keep the previous
    /// snapshot untouched.
    fn apply_resolution(
        &mut self,
        generation: u64,
        kind: QueryKind,
        result: Result<GraphSnapshot>,
    ) {
        if generation != self.generation {
            warn!(
                generation,
                latest = self.generation,
                "discarding stale query resolution"
            );
            return;
        }

        match result {
            Ok(snapshot) => self.install_snapshot(kind, snapshot),
            Err(error) => {
                warn!(%error, "graph query failed; keeping previous snapshot");
                self.status_line = Some(format!("Query failed: {error:#}"));
            }
        }
    }

    fn install_snapshot(&mut self, kind: QueryKind, mut snapshot: GraphSnapshot) {
        self.layout.prime(&mut snapshot);
        info!(
            nodes = snapshot.node_count(),
            links = snapshot.link_count(),
            hub = self.layout.hub_mode(),
            "snapshot installed"
        );

        self.snapshot = snapshot;
        self.has_loaded_once = true;
        self.interaction.reset();
        self.fit_camera_pending = false;
        self.status_line = None;

        if kind == QueryKind::HubFocus {
            // A neighborhood is only legible with every kind on screen.
            self.type_filter.show_all();
        }
        self.maybe_release_ring();
    }

    pub(in crate::app) fn toggle_kind(&mut self, kind: NodeKind) {
        if self.type_filter.toggle(kind) {
            self.maybe_release_ring();
        }
    }

    /// The taxpayer ring stays frozen while at most one other kind is on
    /// the canvas. Once taxpayers are shown alongside several other
    /// visible kinds the ring reads as an artifact, so the pins come off
    /// and the simulation reheats to redistribute.
    fn maybe_release_ring(&mut self) {
        if !self.type_filter.is_visible(NodeKind::Taxpayer) {
            return;
        }

        let other_kinds_shown = NodeKind::ALL
            .into_iter()
            .filter(|&kind| {
                kind != NodeKind::Taxpayer
                    && self.type_filter.is_visible(kind)
                    && self.snapshot.nodes.iter().any(|node| node.kind == kind)
            })
            .count();

        if other_kinds_shown >= 2 {
            self.layout.release_primary_ring(&mut self.snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NodeKind;
    use crate::data::test_support::node;

    struct NoopQuery;

    impl GraphQuery for NoopQuery {
        fn load_default(&self, _limit: usize) -> Result<GraphSnapshot> {
            Ok(GraphSnapshot::default())
        }
        fn search(&self, _query: &str) -> Result<GraphSnapshot> {
            Ok(GraphSnapshot::default())
        }
        fn entity_neighborhood(&self, _entity_id: &str) -> Result<GraphSnapshot> {
            Ok(GraphSnapshot::default())
        }
        fn detect_cycles(&self) -> Result<Vec<CycleAlert>> {
            Ok(Vec::new())
        }
    }

    fn model() -> ViewModel {
        ViewModel::new(Arc::new(NoopQuery), 200)
    }

    fn named_snapshot(id: &str) -> GraphSnapshot {
        GraphSnapshot::new(vec![node(id, NodeKind::Taxpayer)], vec![])
    }

    #[test]
    fn stale_resolution_never_overwrites_a_newer_request() {
        let mut model = model();

        // A search goes out, then a reset supersedes it.
        model.generation = 1;
        model.apply_resolution(1, QueryKind::FullLoad, Ok(named_snapshot("fresh")));
        assert_eq!(model.snapshot.nodes[0].id, "fresh");

        model.generation = 2;
        model.apply_resolution(2, QueryKind::FullLoad, Ok(named_snapshot("reset")));
        model.apply_resolution(1, QueryKind::Search, Ok(named_snapshot("stale-search")));

        assert_eq!(model.snapshot.nodes[0].id, "reset");
    }

    #[test]
    fn failed_query_retains_previous_snapshot() {
        let mut model = model();

        model.generation = 1;
        model.apply_resolution(1, QueryKind::FullLoad, Ok(named_snapshot("good")));

        model.generation = 2;
        model.apply_resolution(
            2,
            QueryKind::Search,
            Err(anyhow::anyhow!("backend unreachable")),
        );

        assert_eq!(model.snapshot.nodes[0].id, "good");
        assert!(model.status_line.as_deref().unwrap_or("").contains("failed"));
    }

    #[test]
    fn hub_resolution_resets_the_type_filter_to_all() {
        let mut model = model();
        model.type_filter.toggle(NodeKind::Invoice);
        model.type_filter.toggle(NodeKind::User);
        assert!(!model.type_filter.is_visible(NodeKind::Invoice));

        let mut hub = node("hub", NodeKind::Taxpayer);
        hub.is_center = true;
        model.generation = 1;
        model.apply_resolution(
            1,
            QueryKind::HubFocus,
            Ok(GraphSnapshot::new(vec![hub], vec![])),
        );

        for kind in NodeKind::ALL {
            assert!(model.type_filter.is_visible(kind));
        }
    }

    #[test]
    fn ring_pins_release_once_multiple_other_kinds_are_shown() {
        let mut model = model();
        model.generation = 1;
        model.apply_resolution(
            1,
            QueryKind::FullLoad,
            Ok(GraphSnapshot::new(
                vec![
                    node("t1", NodeKind::Taxpayer),
                    node("t2", NodeKind::Taxpayer),
                    node("i1", NodeKind::Invoice),
                    node("r1", NodeKind::Gstr1Return),
                ],
                vec![],
            )),
        );

        // Default view: taxpayers + invoices. One other kind, ring stays.
        assert!(model.snapshot.nodes.iter().any(|n| n.is_pinned()));

        model.toggle_kind(NodeKind::Gstr1Return);
        assert!(model.snapshot.nodes.iter().all(|n| !n.is_pinned()));
    }

    #[test]
    fn selection_is_cleared_when_a_snapshot_is_replaced() {
        let mut model = model();
        model.generation = 1;
        model.apply_resolution(1, QueryKind::FullLoad, Ok(named_snapshot("first")));

        model.interaction.click_node(0, &model.snapshot);
        assert!(model.interaction.selected().is_some());

        model.generation = 2;
        model.apply_resolution(2, QueryKind::FullLoad, Ok(named_snapshot("second")));
        assert!(model.interaction.selected().is_none());
    }
}
