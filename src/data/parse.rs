use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::model::{GraphNode, GraphSnapshot, LinkKind, NodeKind, RawLink};

#[derive(Clone, Debug, Deserialize)]
struct WireNode {
    id: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default, rename = "isCenter")]
    is_center: bool,
}

#[derive(Clone, Debug, Deserialize)]
struct WireEdge {
    source: String,
    #[serde(default)]
    target: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
struct WireGraph {
    #[serde(default)]
    nodes: Vec<WireNode>,
    #[serde(default, alias = "links")]
    edges: Vec<WireEdge>,
}

pub fn parse_snapshot(raw: &str) -> Result<GraphSnapshot> {
    let wire: WireGraph =
        serde_json::from_str(raw).context("invalid JSON from graph query service")?;
    Ok(snapshot_from_wire(wire))
}

fn snapshot_from_wire(wire: WireGraph) -> GraphSnapshot {
    let mut nodes = Vec::with_capacity(wire.nodes.len());
    for wire_node in wire.nodes {
        let Some(kind) = node_kind(&wire_node) else {
            warn!(id = %wire_node.id, "node with unknown label set dropped");
            continue;
        };

        let properties = flatten_properties(&wire_node.properties);
        let label = display_label(kind, &wire_node.id, &properties);
        let is_center = wire_node.is_center
            || wire_node
                .properties
                .get("is_center")
                .and_then(Value::as_bool)
                .unwrap_or(false);

        let mut node = GraphNode::new(wire_node.id, label, kind);
        node.is_center = is_center;
        node.properties = properties;
        nodes.push(node);
    }

    let mut raw_links = Vec::with_capacity(wire.edges.len());
    for edge in wire.edges {
        // The unscoped query emits a row per node even when it has no
        // outgoing relationship; those rows carry a null target.
        let Some(target) = edge.target else {
            continue;
        };
        let Some(kind_str) = edge.kind.as_deref() else {
            continue;
        };
        let Some(kind) = LinkKind::from_wire(kind_str) else {
            warn!(kind = kind_str, "relationship of unknown kind dropped");
            continue;
        };

        raw_links.push(RawLink {
            source: edge.source,
            target,
            kind,
            volume: edge
                .properties
                .get("volume")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            frequency: edge
                .properties
                .get("frequency")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
        });
    }

    GraphSnapshot::new(nodes, raw_links)
}

fn node_kind(node: &WireNode) -> Option<NodeKind> {
    node.labels.iter().find_map(|label| NodeKind::from_wire(label))
}

fn display_label(kind: NodeKind, id: &str, properties: &BTreeMap<String, String>) -> String {
    let pick = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| properties.get(*key))
            .cloned()
    };

    let label = match kind {
        NodeKind::Taxpayer => pick(&["legal_name", "trade_name", "gstin"]),
        NodeKind::Invoice => pick(&["invoice_number", "invoice_id"]),
        NodeKind::Gstr1Return | NodeKind::Gstr2bReturn | NodeKind::Gstr3bReturn => properties
            .get("return_period")
            .map(|period| format!("{} {period}", kind.label())),
        NodeKind::User => pick(&["name", "email"]),
    };

    label.unwrap_or_else(|| id.to_owned())
}

fn flatten_properties(properties: &Map<String, Value>) -> BTreeMap<String, String> {
    properties
        .iter()
        .filter_map(|(key, value)| scalar_to_string(value).map(|text| (key.clone(), text)))
        .collect()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CycleAlert {
    pub cycle: Vec<String>,
    pub names: Vec<String>,
    pub cycle_length: usize,
}

pub fn parse_cycles(raw: &str) -> Result<Vec<CycleAlert>> {
    let parsed: Value =
        serde_json::from_str(raw).context("invalid JSON from circular trade query")?;
    let entries = parsed
        .as_array()
        .ok_or_else(|| anyhow!("expected a JSON array of circular trades"))?;

    entries
        .iter()
        .map(|entry| CycleAlert::deserialize(entry).context("invalid circular trade entry"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            {"id": "t1", "labels": ["Taxpayer"], "properties": {"gstin": "27A", "legal_name": "Acme Traders", "state_code": "27"}},
            {"id": "i1", "labels": ["Invoice"], "properties": {"invoice_number": "INV-001", "taxable_value": 1000}},
            {"id": "r1", "labels": ["GSTR1Return"], "properties": {"return_period": "012026"}},
            {"id": "x1", "labels": ["Mystery"], "properties": {}}
        ],
        "edges": [
            {"source": "i1", "target": "t1", "type": "SUPPLIED_BY", "properties": {}},
            {"source": "t1", "target": null, "type": null, "properties": {}},
            {"source": "r1", "target": "i1", "type": "CONTAINS_OUTWARD", "properties": {}},
            {"source": "t1", "target": "i1", "type": "SMUGGLED_PAST", "properties": {}}
        ]
    }"#;

    #[test]
    fn parses_nodes_with_domain_labels() {
        let snapshot = parse_snapshot(SAMPLE).unwrap();

        assert_eq!(snapshot.node_count(), 3);
        let taxpayer = &snapshot.nodes[snapshot.index_by_id["t1"]];
        assert_eq!(taxpayer.kind, NodeKind::Taxpayer);
        assert_eq!(taxpayer.label, "Acme Traders");
        assert_eq!(taxpayer.properties.get("state_code").unwrap(), "27");

        let filing = &snapshot.nodes[snapshot.index_by_id["r1"]];
        assert_eq!(filing.label, "GSTR-1 012026");
    }

    #[test]
    fn null_targets_and_unknown_kinds_are_dropped() {
        let snapshot = parse_snapshot(SAMPLE).unwrap();
        assert_eq!(snapshot.link_count(), 2);
    }

    #[test]
    fn edge_metrics_default_to_zero() {
        let raw = r#"{
            "nodes": [
                {"id": "a", "labels": ["Taxpayer"], "properties": {}},
                {"id": "b", "labels": ["Taxpayer"], "properties": {}}
            ],
            "edges": [
                {"source": "a", "target": "b", "type": "TRADES_WITH", "properties": {"volume": 5400.5, "frequency": 3}},
                {"source": "b", "target": "a", "type": "TRADES_WITH", "properties": {}}
            ]
        }"#;

        let snapshot = parse_snapshot(raw).unwrap();
        assert_eq!(snapshot.links[0].volume, 5400.5);
        assert_eq!(snapshot.links[0].frequency, 3);
        assert_eq!(snapshot.links[1].volume, 0.0);
        assert_eq!(snapshot.links[1].frequency, 0);
    }

    #[test]
    fn center_flag_is_read_from_wire_or_properties() {
        let raw = r#"{
            "nodes": [
                {"id": "hub", "labels": ["Taxpayer"], "properties": {"is_center": true}},
                {"id": "spoke", "labels": ["Taxpayer"], "properties": {}}
            ],
            "edges": []
        }"#;

        let snapshot = parse_snapshot(raw).unwrap();
        assert_eq!(snapshot.center_index, Some(0));
    }

    #[test]
    fn parses_circular_trade_alerts() {
        let raw = r#"[
            {"cycle": ["a", "b", "a"], "names": ["A Ltd", "B Ltd", "A Ltd"], "cycle_length": 2}
        ]"#;

        let cycles = parse_cycles(raw).unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].cycle_length, 2);
        assert_eq!(cycles[0].names[1], "B Ltd");
    }
}
