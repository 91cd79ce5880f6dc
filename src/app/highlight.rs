use std::collections::HashSet;

use crate::data::GraphSnapshot;

/// Everything the current reference node lights up: the reference itself,
/// each link touching it, and each direct neighbor. Rebuilt whenever the
/// reference changes; rendering dims the complement.
#[derive(Clone, Debug)]
pub struct MatchSet {
    pub reference: usize,
    nodes: HashSet<usize>,
    links: HashSet<usize>,
}

impl MatchSet {
    pub fn contains_node(&self, index: usize) -> bool {
        self.nodes.contains(&index)
    }

    pub fn contains_link(&self, index: usize) -> bool {
        self.links.contains(&index)
    }
}

pub fn build_match_set(snapshot: &GraphSnapshot, reference: usize) -> MatchSet {
    let mut nodes = HashSet::new();
    let mut links = HashSet::new();

    nodes.insert(reference);
    for (index, link) in snapshot.links.iter().enumerate() {
        if link.touches(reference) {
            links.insert(index);
            nodes.insert(link.source);
            nodes.insert(link.target);
        }
    }

    MatchSet {
        reference,
        nodes,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{link, node};
    use crate::data::{LinkKind, NodeKind};

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::new(
            vec![
                node("t1", NodeKind::Taxpayer),
                node("t2", NodeKind::Taxpayer),
                node("i1", NodeKind::Invoice),
                node("i2", NodeKind::Invoice),
            ],
            vec![
                link("t1", "t2", LinkKind::TradesWith),
                link("i1", "t1", LinkKind::SuppliedBy),
                link("i2", "t2", LinkKind::SuppliedTo),
            ],
        )
    }

    #[test]
    fn match_set_covers_reference_neighbors_and_touching_links() {
        let snapshot = snapshot();
        let matches = build_match_set(&snapshot, 0);

        assert!(matches.contains_node(0));
        assert!(matches.contains_node(1));
        assert!(matches.contains_node(2));
        assert!(!matches.contains_node(3));

        assert!(matches.contains_link(0));
        assert!(matches.contains_link(1));
        assert!(!matches.contains_link(2));
    }

    #[test]
    fn match_set_tracks_the_reference_exactly() {
        let snapshot = snapshot();

        let from_t2 = build_match_set(&snapshot, 1);
        assert!(from_t2.contains_node(3));
        assert!(!from_t2.contains_node(2));

        let from_isolated = build_match_set(
            &GraphSnapshot::new(vec![node("lone", NodeKind::User)], vec![]),
            0,
        );
        assert!(from_isolated.contains_node(0));
        assert!(!from_isolated.contains_link(0));
    }
}
