mod model;
mod parse;
mod query;

pub use model::{GraphLink, GraphNode, GraphSnapshot, LinkKind, NodeKind, RawLink};
pub use parse::{CycleAlert, parse_snapshot};
pub use query::{FixtureGraphQuery, GraphQuery, HttpGraphQuery};

#[cfg(test)]
pub(crate) use model::test_support;
