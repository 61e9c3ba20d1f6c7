use crate::block::NodeId;
use crate::pair::PairSearchModel;
use crate::root::RootSearchModel;
use serde::Serialize;

const PAIR_FACTOR: u64 = 1000;

/// Pairs found around one candidate node, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSearchModel {
    /// Candidate node whose type matched the filter root
    pub root: NodeId,
    pub pairs: Vec<PairSearchModel>,
    /// `pairs * 1000 + average pair hash`; ranks longer chains first
    pub hash: u64,
}

impl ChainSearchModel {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            pairs: Vec::new(),
            hash: 0,
        }
    }

    /// Record a pair unless either node is already part of the chain
    pub fn add(&mut self, pair: PairSearchModel) -> bool {
        if self.pairs.iter().any(|p| p.source == pair.source || p.filter == pair.filter) {
            return false;
        }
        self.pairs.push(pair);
        true
    }

    /// Floored mean of the pair hashes; 0 for an empty chain
    pub fn average(&self) -> u32 {
        if self.pairs.is_empty() {
            return 0;
        }
        let sum: u64 = self.pairs.iter().map(|p| u64::from(p.hash)).sum();
        (sum / self.pairs.len() as u64) as u32
    }

    pub fn update(&mut self) {
        self.hash = self.pairs.len() as u64 * PAIR_FACTOR + u64::from(self.average());
    }

    /// Readable view with tags and paths resolved against both trees
    pub fn info(&self, source: &RootSearchModel, filter: &RootSearchModel) -> ChainInfo {
        let root = source.node(self.root);
        ChainInfo {
            policy: source.id.clone(),
            block_type: root.map(|n| n.block_type().to_string()).unwrap_or_default(),
            tag: root.map(|n| n.tag().to_string()).unwrap_or_default(),
            path: root.map(|n| n.path.clone()).unwrap_or_default(),
            hash: self.hash,
            pairs: self
                .pairs
                .iter()
                .map(|pair| {
                    let s = source.node(pair.source);
                    let f = filter.node(pair.filter);
                    PairInfo {
                        source_tag: s.map(|n| n.tag().to_string()).unwrap_or_default(),
                        source_path: s.map(|n| n.path.clone()).unwrap_or_default(),
                        filter_tag: f.map(|n| n.tag().to_string()).unwrap_or_default(),
                        hash: pair.hash,
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    pub block_type: String,
    pub tag: String,
    pub path: Vec<usize>,
    pub hash: u64,
    pub pairs: Vec<PairInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    pub source_tag: String,
    pub source_path: Vec<usize>,
    pub filter_tag: String,
    pub hash: u32,
}
