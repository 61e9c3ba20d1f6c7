use crate::block::{BlockSearchModel, NodeId};
use policy_compare::CompareOptions;
use serde::Serialize;

/// A source node matched against a filter node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairSearchModel {
    pub source: NodeId,
    pub filter: NodeId,
    /// Block similarity of the two nodes, 0..=100
    pub hash: u32,
}

impl PairSearchModel {
    pub fn new(source: &BlockSearchModel, filter: &BlockSearchModel, options: &CompareOptions) -> Self {
        Self {
            source: source.id,
            filter: filter.id,
            hash: source.compare(filter, options),
        }
    }
}
