use crate::block::{BlockSearchModel, NodeId};
use crate::chain::ChainSearchModel;
use crate::error::{Result, SearchError};
use crate::utils::SearchUtils;
use policy_compare::models::BlockModel;
use policy_compare::CompareOptions;
use serde_json::Value;

/// Arena of linked block nodes for one policy, tool or module config.
///
/// Built in two passes: [`Self::from_block`] links parents and children in
/// pre-order, [`Self::update`] then fills sibling links and paths.
#[derive(Debug, Clone)]
pub struct RootSearchModel {
    pub id: Option<String>,
    nodes: Vec<BlockSearchModel>,
    options: CompareOptions,
}

impl RootSearchModel {
    pub fn from_block(id: Option<String>, tree: &BlockModel, options: CompareOptions) -> Self {
        let mut root = Self {
            id,
            nodes: Vec::with_capacity(tree.count()),
            options,
        };
        root.link(tree, None);
        root.update();
        root
    }

    /// Parse a `config` block tree
    pub fn from_json(id: Option<String>, config: &Value, options: CompareOptions) -> Result<Self> {
        let mut tree = BlockModel::from_json(config)?;
        tree.update(&options);
        Ok(Self::from_block(id, &tree, options))
    }

    /// Build from a policy record, reading its `id` and `config`
    pub fn from_policy(record: &Value, options: CompareOptions) -> Result<Self> {
        let id = record.get("id").and_then(Value::as_str).map(str::to_string);
        let config = record.get("config").ok_or(SearchError::EmptyTree)?;
        Self::from_json(id, config, options)
    }

    fn link(&mut self, block: &BlockModel, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(BlockSearchModel::new(id, block.shallow(), parent));
        for child in &block.children {
            let child_id = self.link(child, Some(id));
            self.nodes[id].children.push(child_id);
        }
        id
    }

    /// Fill `prev`/`next` from the sibling lists and `path` from the root
    pub fn update(&mut self) {
        for id in 0..self.nodes.len() {
            let children = self.nodes[id].children.clone();
            for (i, &child) in children.iter().enumerate() {
                self.nodes[child].prev = i.checked_sub(1).map(|p| children[p]);
                self.nodes[child].next = children.get(i + 1).copied();
            }
        }
        // Pre-order arena: a parent's path is always set before its children
        for id in 0..self.nodes.len() {
            let path = match self.nodes[id].parent {
                None => Vec::new(),
                Some(parent) => {
                    let mut path = self.nodes[parent].path.clone();
                    path.push(self.nodes[id].block.index);
                    path
                }
            };
            self.nodes[id].path = path;
        }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    pub fn root(&self) -> Option<&BlockSearchModel> {
        self.nodes.first()
    }

    pub fn node(&self, id: NodeId) -> Option<&BlockSearchModel> {
        self.nodes.get(id)
    }

    /// All nodes in pre-order
    pub fn nodes(&self) -> &[BlockSearchModel] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node in pre-order carrying the tag
    pub fn find_by_tag(&self, tag: &str) -> Result<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.tag() == tag)
            .map(|n| n.id)
            .ok_or_else(|| SearchError::filter_not_found(format!("tag {tag}")))
    }

    pub fn find_by_path(&self, path: &[usize]) -> Result<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.path == path)
            .map(|n| n.id)
            .ok_or_else(|| SearchError::filter_not_found(format!("path {path:?}")))
    }

    /// Chains in this tree matching the filter subtree rooted at `filter_node`
    pub fn search(&self, filter: &RootSearchModel, filter_node: NodeId) -> Result<Vec<ChainSearchModel>> {
        SearchUtils::search(self, filter, filter_node)
    }
}
