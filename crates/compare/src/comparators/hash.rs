use super::policy::PolicyComparator;
use crate::error::Result;
use crate::hash::{sha256_hex, WeightTree};
use crate::models::{ObjectModel, PolicyModel};
use crate::options::CompareOptions;
use crate::result::ModelInfo;
use crate::store::DocumentStore;
use crate::utils::CompareUtils;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ROLES_FACTOR: u32 = 2;
const GROUPS_FACTOR: u32 = 2;
const TOPICS_FACTOR: u32 = 1;
const TOKENS_FACTOR: u32 = 1;
const TREE_FACTOR: u32 = 5;

/// Structural weights of a policy, stored next to it for similarity lookups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyHash {
    pub roles: Vec<WeightTree>,
    pub groups: Vec<WeightTree>,
    pub topics: Vec<WeightTree>,
    pub tokens: Vec<WeightTree>,
    pub tree: WeightTree,
}

/// Policy identity with its weight tree and the digest of that tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashedPolicy {
    pub info: ModelInfo,
    pub hash: String,
    pub tree: PolicyHash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashMatch {
    #[serde(flatten)]
    pub info: ModelInfo,
    pub rate: u32,
}

/// Fast approximate policy similarity over stored weight trees.
///
/// Unlike [`PolicyComparator`] no report is produced: two policies are
/// reduced to multisets of structural weights and scored by their overlap.
pub struct HashComparator;

impl HashComparator {
    /// Load a policy with identifiers excluded from all weights
    pub async fn create_model(store: &dyn DocumentStore, id: &str) -> Result<PolicyModel> {
        PolicyComparator::create_model_by_id(store, id, &CompareOptions::hashing()).await
    }

    pub fn create_tree(policy: &PolicyModel) -> PolicyHash {
        let weights = |items: &[ObjectModel]| -> Vec<WeightTree> {
            items.iter().map(ObjectModel::to_weight).collect()
        };
        PolicyHash {
            roles: weights(&policy.roles),
            groups: weights(&policy.groups),
            topics: weights(&policy.topics),
            tokens: weights(&policy.tokens),
            tree: policy.tree.to_weight(),
        }
    }

    /// Hex SHA-256 of the tree's JSON form
    pub fn create_hash(tree: &PolicyHash) -> Result<String> {
        Ok(sha256_hex(serde_json::to_vec(tree)?))
    }

    pub fn hashed(policy: &PolicyModel) -> Result<HashedPolicy> {
        let tree = Self::create_tree(policy);
        Ok(HashedPolicy {
            info: policy.info(),
            hash: Self::create_hash(&tree)?,
            tree,
        })
    }

    /// Similarity in 0..=100; equal digests short-circuit to 100
    pub fn compare(left: &HashedPolicy, right: &HashedPolicy) -> u32 {
        if left.hash == right.hash {
            return 100;
        }
        let (l, r) = (&left.tree, &right.tree);
        let rates = [
            (Self::compare_array(&l.roles, &r.roles), array_factor(ROLES_FACTOR, &l.roles, &r.roles)),
            (Self::compare_array(&l.groups, &r.groups), array_factor(GROUPS_FACTOR, &l.groups, &r.groups)),
            (Self::compare_array(&l.topics, &r.topics), array_factor(TOPICS_FACTOR, &l.topics, &r.topics)),
            (Self::compare_array(&l.tokens, &r.tokens), array_factor(TOKENS_FACTOR, &l.tokens, &r.tokens)),
            (Self::compare_tree(&l.tree, &r.tree), tree_factor(&l.tree, &r.tree)),
        ];
        log::debug!("Hash rates {rates:?}");
        CompareUtils::calc_weighted_rate(&rates)
    }

    fn compare_array(left: &[WeightTree], right: &[WeightTree]) -> u32 {
        overlap(&weights(left), &weights(right))
    }

    fn compare_tree(left: &WeightTree, right: &WeightTree) -> u32 {
        overlap(&left.weights(), &right.weights())
    }

    /// Candidates other than the target scoring at least `threshold`, best first
    pub fn search(target: &HashedPolicy, candidates: &[HashedPolicy], threshold: u32) -> Vec<HashMatch> {
        let mut found: Vec<HashMatch> = candidates
            .iter()
            .filter(|c| c.info.id.is_none() || c.info.id != target.info.id)
            .map(|c| HashMatch {
                info: c.info.clone(),
                rate: Self::compare(target, c),
            })
            .filter(|m| m.rate >= threshold)
            .collect();
        found.sort_by(|a, b| b.rate.cmp(&a.rate));
        found
    }
}

fn weights(items: &[WeightTree]) -> Vec<&str> {
    items.iter().map(|i| i.weight.as_str()).collect()
}

fn array_factor(base: u32, left: &[WeightTree], right: &[WeightTree]) -> u32 {
    if left.is_empty() && right.is_empty() {
        0
    } else {
        base
    }
}

fn tree_factor(left: &WeightTree, right: &WeightTree) -> u32 {
    if left.children.is_empty() && right.children.is_empty() {
        1
    } else {
        TREE_FACTOR
    }
}

/// Multiset overlap: the smaller of the two matched shares
fn overlap(left: &[&str], right: &[&str]) -> u32 {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => return 100,
        (true, false) | (false, true) => return 0,
        _ => {}
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &weight in left {
        *counts.entry(weight).or_default() += 1;
    }
    let mut matched = 0;
    for weight in right {
        if let Some(count) = counts.get_mut(weight).filter(|c| **c > 0) {
            *count -= 1;
            matched += 1;
        }
    }
    CompareUtils::share_rate(matched, left.len()).min(CompareUtils::share_rate(matched, right.len()))
}
