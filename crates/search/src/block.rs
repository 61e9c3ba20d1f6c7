use policy_compare::models::BlockModel;
use policy_compare::rates::block_rate;
use policy_compare::CompareOptions;

/// Index of a node inside its [`crate::RootSearchModel`] arena
pub type NodeId = usize;

/// One block of a search tree with its relations.
///
/// `parent`, `prev` and `next` are arena indices, not ownership. `prev`,
/// `next` and `path` are only valid after [`crate::RootSearchModel::update`].
#[derive(Debug, Clone)]
pub struct BlockSearchModel {
    pub id: NodeId,
    pub block: BlockModel,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    /// Sibling indices from the root
    pub path: Vec<usize>,
}

impl BlockSearchModel {
    pub fn new(id: NodeId, block: BlockModel, parent: Option<NodeId>) -> Self {
        Self {
            id,
            block,
            parent,
            children: Vec::new(),
            prev: None,
            next: None,
            path: Vec::new(),
        }
    }

    pub fn block_type(&self) -> &str {
        &self.block.block_type
    }

    pub fn tag(&self) -> &str {
        &self.block.tag
    }

    pub fn same_type(&self, other: &BlockSearchModel) -> bool {
        self.block.block_type == other.block.block_type
    }

    /// Block similarity in 0..=100, ignoring children
    pub fn compare(&self, other: &BlockSearchModel, options: &CompareOptions) -> u32 {
        block_rate(Some(&self.block), Some(&other.block), options).total_rate
    }
}
