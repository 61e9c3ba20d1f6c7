use crate::block::{BlockSearchModel, NodeId};
use crate::chain::{ChainInfo, ChainSearchModel};
use crate::error::{Result, SearchError};
use crate::pair::PairSearchModel;
use crate::root::RootSearchModel;
use serde::Serialize;

/// Best chain of one candidate policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyMatch {
    pub id: Option<String>,
    pub hash: u64,
    pub chain: ChainInfo,
}

/// Block pattern search
pub struct SearchUtils;

impl SearchUtils {
    /// Every node of `source` typed like the filter node starts one chain.
    /// From there the walk goes up the parents, along previous and next
    /// siblings, and down the children, advancing in lockstep with the filter
    /// tree while block types keep matching. Chains are ranked by hash,
    /// ties kept in tree order.
    pub fn search(
        source: &RootSearchModel,
        filter: &RootSearchModel,
        filter_node: NodeId,
    ) -> Result<Vec<ChainSearchModel>> {
        if source.is_empty() {
            return Err(SearchError::EmptyTree);
        }
        let target = filter
            .node(filter_node)
            .ok_or_else(|| SearchError::filter_not_found(format!("node {filter_node}")))?;

        let mut chains: Vec<ChainSearchModel> = source
            .nodes()
            .iter()
            .filter(|node| node.same_type(target))
            .map(|node| {
                let mut walk = Walk {
                    source,
                    filter,
                    chain: ChainSearchModel::new(node.id),
                };
                walk.start(node.id, filter_node);
                walk.chain.update();
                walk.chain
            })
            .collect();
        chains.sort_by(|a, b| b.hash.cmp(&a.hash));
        log::debug!("Found {} chains for filter node {filter_node}", chains.len());
        Ok(chains)
    }

    /// Run the same filter over several trees and keep each tree's best
    /// chain when its average pair hash reaches `threshold`.
    pub fn search_policies(
        filter: &RootSearchModel,
        filter_node: NodeId,
        candidates: &[RootSearchModel],
        threshold: u32,
    ) -> Result<Vec<PolicyMatch>> {
        let mut found = Vec::new();
        for candidate in candidates {
            if candidate.is_empty() {
                log::warn!("Skipping empty tree {:?}", candidate.id);
                continue;
            }
            let chains = Self::search(candidate, filter, filter_node)?;
            let Some(best) = chains.first() else {
                continue;
            };
            if best.average() < threshold {
                continue;
            }
            found.push(PolicyMatch {
                id: candidate.id.clone(),
                hash: best.hash,
                chain: best.info(candidate, filter),
            });
        }
        found.sort_by(|a, b| b.hash.cmp(&a.hash));
        Ok(found)
    }
}

struct Walk<'a> {
    source: &'a RootSearchModel,
    filter: &'a RootSearchModel,
    chain: ChainSearchModel,
}

impl Walk<'_> {
    fn start(&mut self, source: NodeId, filter: NodeId) {
        self.add(source, filter);
        self.down(source, filter);
        self.direction(source, filter, |n| n.parent, false);
        self.direction(source, filter, |n| n.prev, true);
        self.direction(source, filter, |n| n.next, true);
    }

    /// Pair both nodes when their types match
    fn add(&mut self, source: NodeId, filter: NodeId) -> bool {
        let (Some(s), Some(f)) = (self.source.node(source), self.filter.node(filter)) else {
            return false;
        };
        if !s.same_type(f) {
            return false;
        }
        self.chain.add(PairSearchModel::new(s, f, self.source.options()))
    }

    /// Follow one relation on both trees until the types diverge
    fn direction(
        &mut self,
        mut source: NodeId,
        mut filter: NodeId,
        step: fn(&BlockSearchModel) -> Option<NodeId>,
        descend: bool,
    ) {
        loop {
            let next = (
                self.source.node(source).and_then(step),
                self.filter.node(filter).and_then(step),
            );
            let (Some(s), Some(f)) = next else {
                return;
            };
            if !self.add(s, f) {
                return;
            }
            if descend {
                self.down(s, f);
            }
            source = s;
            filter = f;
        }
    }

    /// Children by position, stopping at the first mismatch
    fn down(&mut self, source: NodeId, filter: NodeId) {
        let (Some(s), Some(f)) = (self.source.node(source), self.filter.node(filter)) else {
            return;
        };
        for (&sc, &fc) in s.children.iter().zip(&f.children) {
            if !self.add(sc, fc) {
                break;
            }
            self.down(sc, fc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_compare::CompareOptions;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn step(tag: &str, children: Value) -> Value {
        json!({ "blockType": "interfaceStepBlock", "tag": tag, "children": children })
    }

    fn leaf(kind: &str, tag: &str) -> Value {
        json!({ "blockType": kind, "tag": tag })
    }

    fn root(id: &str, children: Value) -> RootSearchModel {
        let config = json!({ "blockType": "interfaceContainerBlock", "tag": "root", "children": children });
        RootSearchModel::from_json(Some(id.to_string()), &config, CompareOptions::default()).unwrap()
    }

    fn source() -> RootSearchModel {
        root(
            "source",
            json!([
                step("short", json!([leaf("requestVcDocumentBlock", "r1")])),
                step("full", json!([
                    leaf("requestVcDocumentBlock", "r2"),
                    leaf("sendToGuardianBlock", "s2")
                ])),
                leaf("mintDocumentBlock", "mint")
            ]),
        )
    }

    fn filter() -> RootSearchModel {
        root(
            "filter",
            json!([step("pattern", json!([
                leaf("requestVcDocumentBlock", "req"),
                leaf("sendToGuardianBlock", "save")
            ]))]),
        )
    }

    #[test]
    fn test_longest_chain_ranks_first() {
        let (source, filter) = (source(), filter());
        let pattern = filter.find_by_tag("pattern").unwrap();
        let chains = source.search(&filter, pattern).unwrap();
        assert_eq!(chains.len(), 2);

        let best = &chains[0];
        assert_eq!(source.node(best.root).unwrap().tag(), "full");
        // full, r2, s2, and the two container roots
        assert_eq!(best.pairs.len(), 4);
        assert!(best.hash > chains[1].hash);
        assert_eq!(source.node(chains[1].root).unwrap().tag(), "short");
    }

    #[test]
    fn test_children_stop_at_first_mismatch() {
        let source = root(
            "s",
            json!([step("x", json!([
                leaf("sendToGuardianBlock", "first"),
                leaf("requestVcDocumentBlock", "second")
            ]))]),
        );
        let filter = filter();
        let chains = source.search(&filter, filter.find_by_tag("pattern").unwrap()).unwrap();
        let tags: Vec<&str> = chains[0]
            .pairs
            .iter()
            .filter_map(|p| source.node(p.source))
            .map(|n| n.tag())
            .collect();
        assert_eq!(tags, vec!["x", "root"]);
    }

    #[test]
    fn test_search_policies_threshold() {
        let filter = filter();
        let pattern = filter.find_by_tag("pattern").unwrap();
        let other = root("other", json!([leaf("mintDocumentBlock", "m")]));
        let found = SearchUtils::search_policies(&filter, pattern, &[other, source()], 0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_deref(), Some("source"));
        assert_eq!(found[0].chain.tag, "full");

        let strict = SearchUtils::search_policies(&filter, pattern, &[source()], 101).unwrap();
        assert!(strict.is_empty());
    }
}
