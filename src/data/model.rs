use std::collections::{BTreeMap, HashMap};

use eframe::egui::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Taxpayer,
    Invoice,
    Gstr1Return,
    Gstr2bReturn,
    Gstr3bReturn,
    User,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        Self::Taxpayer,
        Self::Invoice,
        Self::Gstr1Return,
        Self::Gstr2bReturn,
        Self::Gstr3bReturn,
        Self::User,
    ];

    pub fn from_wire(label: &str) -> Option<Self> {
        match label {
            "Taxpayer" => Some(Self::Taxpayer),
            "Invoice" => Some(Self::Invoice),
            "GSTR1Return" => Some(Self::Gstr1Return),
            "GSTR2BReturn" => Some(Self::Gstr2bReturn),
            "GSTR3BReturn" => Some(Self::Gstr3bReturn),
            "User" => Some(Self::User),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Taxpayer => "Taxpayer",
            Self::Invoice => "Invoice",
            Self::Gstr1Return => "GSTR-1",
            Self::Gstr2bReturn => "GSTR-2B",
            Self::Gstr3bReturn => "GSTR-3B",
            Self::User => "User",
        }
    }

    /// Taxpayers are the primary entities: they anchor the outer ring and
    /// are the only endpoints admitted into the trade table.
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Taxpayer)
    }

    /// Filing returns and users are hidden until asked for; the default
    /// view is the taxpayer/invoice trading picture.
    pub fn default_visible(self) -> bool {
        matches!(self, Self::Taxpayer | Self::Invoice)
    }

    pub fn is_filing(self) -> bool {
        matches!(self, Self::Gstr1Return | Self::Gstr2bReturn | Self::Gstr3bReturn)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    SuppliedBy,
    SuppliedTo,
    TradesWith,
    ContainsOutward,
    ContainsInward,
    Filed,
    Received,
}

impl LinkKind {
    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            "SUPPLIED_BY" => Some(Self::SuppliedBy),
            "SUPPLIED_TO" => Some(Self::SuppliedTo),
            "TRADES_WITH" => Some(Self::TradesWith),
            "CONTAINS_OUTWARD" => Some(Self::ContainsOutward),
            "CONTAINS_INWARD" => Some(Self::ContainsInward),
            "FILED" => Some(Self::Filed),
            "RECEIVED" => Some(Self::Received),
            _ => None,
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            Self::SuppliedBy => "supplied by",
            Self::SuppliedTo => "supplied to",
            Self::TradesWith => "trades with",
            Self::ContainsOutward => "contains outward",
            Self::ContainsInward => "contains inward",
            Self::Filed => "filed",
            Self::Received => "received",
        }
    }
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub is_center: bool,
    pub pos: Vec2,
    pub pin: Option<Vec2>,
    pub velocity: Vec2,
    pub properties: BTreeMap<String, String>,
}

impl GraphNode {
    pub fn new(id: String, label: String, kind: NodeKind) -> Self {
        Self {
            id,
            label,
            kind,
            is_center: false,
            pos: Vec2::ZERO,
            pin: None,
            velocity: Vec2::ZERO,
            properties: BTreeMap::new(),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }
}

/// Link as it arrives off the wire, endpoints still by id. Resolution into
/// index form (and the dropping of dangling references) happens in
/// [`GraphSnapshot::new`].
#[derive(Clone, Debug)]
pub struct RawLink {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
    pub volume: f64,
    pub frequency: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
    pub kind: LinkKind,
    pub volume: f64,
    pub frequency: u32,
}

impl GraphLink {
    pub fn touches(&self, index: usize) -> bool {
        self.source == index || self.target == index
    }
}

/// One immutable graph dataset. Node positions and pins are the only fields
/// mutated after construction, and only by the layout engine; everything
/// else is replaced wholesale on the next query.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub index_by_id: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    pub center_index: Option<usize>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<GraphNode>, raw_links: Vec<RawLink>) -> Self {
        let mut kept_nodes: Vec<GraphNode> = Vec::with_capacity(nodes.len());
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        let mut center_index = None;

        for mut node in nodes {
            if index_by_id.contains_key(&node.id) {
                continue;
            }

            if node.is_center {
                if center_index.is_some() {
                    node.is_center = false;
                } else {
                    center_index = Some(kept_nodes.len());
                }
            }

            index_by_id.insert(node.id.clone(), kept_nodes.len());
            kept_nodes.push(node);
        }

        let mut links = Vec::with_capacity(raw_links.len());
        for raw in raw_links {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&raw.source),
                index_by_id.get(&raw.target),
            ) else {
                continue;
            };
            if source == target {
                continue;
            }

            links.push(GraphLink {
                source,
                target,
                kind: raw.kind,
                volume: raw.volume,
                frequency: raw.frequency,
            });
        }

        let mut adjacency = vec![Vec::new(); kept_nodes.len()];
        for link in &links {
            adjacency[link.source].push(link.target);
            adjacency[link.target].push(link.source);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        Self {
            nodes: kept_nodes,
            links,
            index_by_id,
            adjacency,
            center_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.adjacency
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// World-space bounding box over all node positions.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = self.nodes.first()?.pos;
        let mut min = first;
        let mut max = first;
        for node in &self.nodes {
            min.x = min.x.min(node.pos.x);
            min.y = min.y.min(node.pos.y);
            max.x = max.x.max(node.pos.x);
            max.y = max.y.max(node.pos.y);
        }
        Some((min, max))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn node(id: &str, kind: NodeKind) -> GraphNode {
        GraphNode::new(id.to_owned(), id.to_uppercase(), kind)
    }

    pub fn link(source: &str, target: &str, kind: LinkKind) -> RawLink {
        RawLink {
            source: source.to_owned(),
            target: target.to_owned(),
            kind,
            volume: 0.0,
            frequency: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{link, node};
    use super::*;

    #[test]
    fn dangling_links_are_dropped_not_errors() {
        let snapshot = GraphSnapshot::new(
            vec![node("t1", NodeKind::Taxpayer), node("i1", NodeKind::Invoice)],
            vec![
                link("i1", "t1", LinkKind::SuppliedBy),
                link("i1", "ghost", LinkKind::SuppliedTo),
                link("ghost", "t1", LinkKind::TradesWith),
            ],
        );

        assert_eq!(snapshot.link_count(), 1);
        assert!(snapshot.links.iter().all(|l| {
            l.source < snapshot.node_count() && l.target < snapshot.node_count()
        }));
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut second = node("t1", NodeKind::Taxpayer);
        second.label = "SHADOW".to_owned();

        let snapshot = GraphSnapshot::new(vec![node("t1", NodeKind::Taxpayer), second], vec![]);

        assert_eq!(snapshot.node_count(), 1);
        assert_eq!(snapshot.nodes[0].label, "T1");
    }

    #[test]
    fn at_most_one_center_survives() {
        let mut a = node("t1", NodeKind::Taxpayer);
        let mut b = node("t2", NodeKind::Taxpayer);
        a.is_center = true;
        b.is_center = true;

        let snapshot = GraphSnapshot::new(vec![a, b], vec![]);

        assert_eq!(snapshot.center_index, Some(0));
        assert_eq!(
            snapshot.nodes.iter().filter(|n| n.is_center).count(),
            1
        );
    }

    #[test]
    fn adjacency_is_undirected_and_deduplicated() {
        let snapshot = GraphSnapshot::new(
            vec![
                node("t1", NodeKind::Taxpayer),
                node("t2", NodeKind::Taxpayer),
            ],
            vec![
                link("t1", "t2", LinkKind::TradesWith),
                link("t2", "t1", LinkKind::TradesWith),
            ],
        );

        assert_eq!(snapshot.neighbors(0), &[1]);
        assert_eq!(snapshot.neighbors(1), &[0]);
    }
}
