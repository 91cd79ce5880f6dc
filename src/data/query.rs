use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use super::model::{GraphLink, GraphSnapshot, RawLink};
use super::parse::{CycleAlert, parse_cycles, parse_snapshot};

/// External graph-query collaborator. Implementations return one atomic
/// snapshot per call; the caller owns staleness handling.
pub trait GraphQuery: Send + Sync {
    fn load_default(&self, limit: usize) -> Result<GraphSnapshot>;
    fn search(&self, query: &str) -> Result<GraphSnapshot>;
    fn entity_neighborhood(&self, entity_id: &str) -> Result<GraphSnapshot>;
    fn detect_cycles(&self) -> Result<Vec<CycleAlert>>;
}

pub struct HttpGraphQuery {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpGraphQuery {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("graph query {url} returned {status}"));
        }

        response
            .text()
            .with_context(|| format!("failed to read response body from {url}"))
    }
}

impl GraphQuery for HttpGraphQuery {
    fn load_default(&self, limit: usize) -> Result<GraphSnapshot> {
        let limit = limit.to_string();
        let raw = self.get("/graph/nodes", &[("limit", limit.as_str())])?;
        parse_snapshot(&raw)
    }

    fn search(&self, query: &str) -> Result<GraphSnapshot> {
        let raw = self.get("/graph/search", &[("q", query)])?;
        parse_snapshot(&raw)
    }

    fn entity_neighborhood(&self, entity_id: &str) -> Result<GraphSnapshot> {
        let raw = self.get("/graph/taxpayer-network", &[("gstin", entity_id)])?;
        parse_snapshot(&raw)
    }

    fn detect_cycles(&self) -> Result<Vec<CycleAlert>> {
        let raw = self.get("/graph/circular-trades", &[])?;
        parse_cycles(&raw)
    }
}

/// Offline backend reading one exported graph JSON file. Search and
/// neighborhood queries are evaluated client-side over the full fixture.
pub struct FixtureGraphQuery {
    path: PathBuf,
}

impl FixtureGraphQuery {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn full_snapshot(&self) -> Result<GraphSnapshot> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read fixture {}", self.path.display()))?;
        parse_snapshot(&raw)
    }
}

impl GraphQuery for FixtureGraphQuery {
    fn load_default(&self, limit: usize) -> Result<GraphSnapshot> {
        let full = self.full_snapshot()?;
        if full.node_count() <= limit {
            return Ok(full);
        }

        let kept = (0..limit).collect::<Vec<_>>();
        Ok(sub_snapshot(&full, &kept, None))
    }

    fn search(&self, query: &str) -> Result<GraphSnapshot> {
        let full = self.full_snapshot()?;
        let needle = query.to_lowercase();
        let kept = full
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                node.id.to_lowercase().contains(&needle)
                    || node.label.to_lowercase().contains(&needle)
            })
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        Ok(sub_snapshot(&full, &kept, None))
    }

    fn entity_neighborhood(&self, entity_id: &str) -> Result<GraphSnapshot> {
        let full = self.full_snapshot()?;
        let &center = full
            .index_by_id
            .get(entity_id)
            .ok_or_else(|| anyhow!("entity {entity_id} not present in fixture"))?;

        let mut kept = vec![center];
        kept.extend_from_slice(full.neighbors(center));
        kept.sort_unstable();
        kept.dedup();

        Ok(sub_snapshot(&full, &kept, Some(center)))
    }

    fn detect_cycles(&self) -> Result<Vec<CycleAlert>> {
        Ok(Vec::new())
    }
}

fn sub_snapshot(full: &GraphSnapshot, kept: &[usize], center: Option<usize>) -> GraphSnapshot {
    let nodes = kept
        .iter()
        .filter_map(|&index| full.nodes.get(index))
        .map(|node| {
            let mut node = node.clone();
            node.is_center = center.is_some_and(|c| full.index_by_id.get(&node.id) == Some(&c));
            node
        })
        .collect::<Vec<_>>();

    let raw_links = full
        .links
        .iter()
        .filter_map(|link| raw_link_between(full, link))
        .collect::<Vec<_>>();

    GraphSnapshot::new(nodes, raw_links)
}

fn raw_link_between(full: &GraphSnapshot, link: &GraphLink) -> Option<RawLink> {
    let source = full.nodes.get(link.source)?;
    let target = full.nodes.get(link.target)?;
    Some(RawLink {
        source: source.id.clone(),
        target: target.id.clone(),
        kind: link.kind,
        volume: link.volume,
        frequency: link.frequency,
    })
}
