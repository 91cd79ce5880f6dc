use std::collections::{BTreeSet, HashSet};

use crate::data::{GraphSnapshot, LinkKind, NodeKind};

/// Set of node kinds currently shown. Toggling the last visible kind off
/// is refused so the canvas can never be emptied by filtering alone.
#[derive(Clone, Debug)]
pub struct TypeFilter {
    visible: BTreeSet<NodeKind>,
}

impl Default for TypeFilter {
    fn default() -> Self {
        Self {
            visible: NodeKind::ALL
                .into_iter()
                .filter(|kind| kind.default_visible())
                .collect(),
        }
    }
}

impl TypeFilter {
    pub fn is_visible(&self, kind: NodeKind) -> bool {
        self.visible.contains(&kind)
    }

    pub fn visible_kind_count(&self) -> usize {
        self.visible.len()
    }

    /// Returns true when the toggle changed anything.
    pub fn toggle(&mut self, kind: NodeKind) -> bool {
        if self.visible.contains(&kind) {
            if self.visible.len() == 1 {
                return false;
            }
            self.visible.remove(&kind);
        } else {
            self.visible.insert(kind);
        }
        true
    }

    pub fn show_all(&mut self) {
        self.visible = NodeKind::ALL.into_iter().collect();
    }
}

pub fn visible_nodes(snapshot: &GraphSnapshot, filter: &TypeFilter) -> Vec<usize> {
    snapshot
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| filter.is_visible(node.kind))
        .map(|(index, _)| index)
        .collect()
}

/// Link indices whose both endpoints survive the type filter; a link to a
/// hidden node is hidden with it.
pub fn visible_links(snapshot: &GraphSnapshot, filter: &TypeFilter) -> Vec<usize> {
    let shown: HashSet<usize> = visible_nodes(snapshot, filter).into_iter().collect();

    snapshot
        .links
        .iter()
        .enumerate()
        .filter(|(_, link)| shown.contains(&link.source) && shown.contains(&link.target))
        .map(|(index, _)| index)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    Supplier,
    Buyer,
    Volume,
    Frequency,
}

impl SortColumn {
    pub fn label(self) -> &'static str {
        match self {
            Self::Supplier => "Supplier",
            Self::Buyer => "Buyer",
            Self::Volume => "Volume",
            Self::Frequency => "Frequency",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableSort {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for TableSort {
    fn default() -> Self {
        Self {
            column: SortColumn::Volume,
            descending: true,
        }
    }
}

impl TableSort {
    /// Re-clicking the active column flips direction; a new column starts
    /// descending.
    pub fn click(&mut self, column: SortColumn) {
        if self.column == column {
            self.descending = !self.descending;
        } else {
            self.column = column;
            self.descending = true;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TradeRow {
    pub supplier_id: String,
    pub supplier_label: String,
    pub buyer_id: String,
    pub buyer_label: String,
    pub volume: f64,
    pub frequency: u32,
    pub kind: LinkKind,
}

/// Tabular projection of direct taxpayer-to-taxpayer relationships,
/// independent of the type filter. Deduplicated on
/// (source id, target id, kind): the first-seen link wins and contributes
/// the row's metrics.
pub fn trade_rows(snapshot: &GraphSnapshot) -> Vec<TradeRow> {
    let mut seen: HashSet<(usize, usize, LinkKind)> = HashSet::new();
    let mut rows = Vec::new();

    for link in &snapshot.links {
        let (Some(supplier), Some(buyer)) = (
            snapshot.nodes.get(link.source),
            snapshot.nodes.get(link.target),
        ) else {
            continue;
        };
        if !supplier.kind.is_primary() || !buyer.kind.is_primary() {
            continue;
        }
        if !seen.insert((link.source, link.target, link.kind)) {
            continue;
        }

        rows.push(TradeRow {
            supplier_id: supplier.id.clone(),
            supplier_label: supplier.label.clone(),
            buyer_id: buyer.id.clone(),
            buyer_label: buyer.label.clone(),
            volume: link.volume,
            frequency: link.frequency,
            kind: link.kind,
        });
    }

    rows
}

pub fn sort_rows(rows: &mut [TradeRow], sort: TableSort) {
    rows.sort_by(|a, b| {
        let ordering = match sort.column {
            SortColumn::Supplier => a
                .supplier_label
                .cmp(&b.supplier_label)
                .then_with(|| a.supplier_id.cmp(&b.supplier_id)),
            SortColumn::Buyer => a
                .buyer_label
                .cmp(&b.buyer_label)
                .then_with(|| a.buyer_id.cmp(&b.buyer_id)),
            SortColumn::Volume => a.volume.total_cmp(&b.volume),
            SortColumn::Frequency => a.frequency.cmp(&b.frequency),
        };

        let ordering = ordering.then_with(|| {
            a.supplier_id
                .cmp(&b.supplier_id)
                .then_with(|| a.buyer_id.cmp(&b.buyer_id))
        });

        if sort.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}
