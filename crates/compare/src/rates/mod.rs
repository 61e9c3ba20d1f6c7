//! Rate primitives.
//!
//! A [`Rate`] is the scored outcome of comparing one left item against one
//! right item. Either side may be missing (`Removed` / `Added`). Paired rates
//! carry named sub-rates which are combined into `total_rate`.

mod blocks;
mod documents;
mod fields;
mod list;
mod object;

pub use blocks::{block_rate, BLOCK_WEIGHTS};
pub use documents::document_rate;
pub use fields::field_rate;
pub use list::{artifacts_rate, events_rate, permissions_rate, properties_rate};
pub use object::object_rate;

use crate::utils::CompareUtils;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Sub-rate names
pub const INDEX_RATE: &str = "index";
pub const PROPERTIES_RATE: &str = "properties";
pub const EVENTS_RATE: &str = "events";
pub const PERMISSIONS_RATE: &str = "permissions";
pub const ARTIFACTS_RATE: &str = "artifacts";
pub const KEY_RATE: &str = "key";
pub const DOCUMENTS_RATE: &str = "documents";
pub const OPTIONS_RATE: &str = "options";
pub const TOTAL_RATE: &str = "total";

/// Anything that can sit on one side of a [`Rate`]
pub trait CompareItem {
    /// Stable identity used for alignment (tag, name, path, ...)
    fn key(&self) -> String;

    /// Report representation
    fn to_object(&self) -> Value;
}

impl CompareItem for String {
    fn key(&self) -> String {
        self.clone()
    }

    fn to_object(&self) -> Value {
        Value::String(self.clone())
    }
}

/// Outcome of one left/right pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateType {
    /// Present only on the right
    Added,
    /// Present only on the left
    Removed,
    Equal,
    Partly,
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::Equal => "Equal",
            Self::Partly => "Partly",
        };
        f.write_str(name)
    }
}

/// Score of one aspect of a pair, with the item-level rates behind it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubRate {
    pub rate: u32,
    pub items: Vec<Value>,
}

impl SubRate {
    pub fn scored(rate: u32) -> Self {
        Self {
            rate,
            items: Vec::new(),
        }
    }

    /// Floored share of `Equal` item rates
    pub fn from_rates<T: CompareItem>(rates: &[Rate<'_, T>]) -> Self {
        let equal = rates.iter().filter(|r| r.kind == RateType::Equal).count();
        Self {
            rate: CompareUtils::share_rate(equal, rates.len()),
            items: rates.iter().map(Rate::to_object).collect(),
        }
    }
}

/// Scored comparison of two (optional) items of the same kind
#[derive(Debug, Clone)]
pub struct Rate<'a, T> {
    pub left: Option<&'a T>,
    pub right: Option<&'a T>,
    pub kind: RateType,
    pub total_rate: u32,
    pub sub_rates: IndexMap<&'static str, SubRate>,
    pub children: Vec<Rate<'a, T>>,
}

impl<'a, T> Rate<'a, T> {
    pub fn new(left: Option<&'a T>, right: Option<&'a T>) -> Self {
        let (kind, total_rate) = match (left, right) {
            (Some(_), None) => (RateType::Removed, 0),
            (None, Some(_)) => (RateType::Added, 0),
            _ => (RateType::Equal, 100),
        };
        Self {
            left,
            right,
            kind,
            total_rate,
            sub_rates: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Pair scored as a single yes/no outcome
    pub fn binary(left: &'a T, right: &'a T, equal: bool) -> Self {
        let mut rate = Self::new(Some(left), Some(right));
        if !equal {
            rate.kind = RateType::Partly;
            rate.total_rate = 0;
        }
        rate
    }

    pub fn is_paired(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn set_sub_rate(&mut self, name: &'static str, sub_rate: SubRate) {
        self.sub_rates.insert(name, sub_rate);
    }

    pub fn sub_rate(&self, name: &str) -> Option<&SubRate> {
        self.sub_rates.get(name)
    }

    /// Value of a named sub-rate, or the total for [`TOTAL_RATE`]
    pub fn rate_value(&self, name: &str) -> Option<u32> {
        if name == TOTAL_RATE {
            return Some(self.total_rate);
        }
        self.sub_rates.get(name).map(|sub| sub.rate)
    }

    /// Combine the present sub-rates with the given weights.
    ///
    /// The row is `Equal` only when every sub-rate is 100 and the keys
    /// matched; unpaired rates keep `Added`/`Removed` and a total of 0.
    pub fn finish(&mut self, weights: &[(&str, u32)], keys_equal: bool) {
        if !self.is_paired() {
            self.total_rate = 0;
            return;
        }
        let weighted: Vec<(u32, u32)> = weights
            .iter()
            .filter_map(|(name, weight)| self.rate_value(name).map(|rate| (rate, *weight)))
            .collect();
        self.total_rate = CompareUtils::calc_weighted_rate(&weighted);
        let all_full = self.sub_rates.values().all(|sub| sub.rate == 100);
        self.kind = if keys_equal && all_full && self.total_rate == 100 {
            RateType::Equal
        } else {
            RateType::Partly
        };
    }

    /// Number of rates in this subtree (including self)
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Rate::size).sum::<usize>()
    }

    /// Pre-order walk over this subtree
    pub fn flatten(&self) -> Vec<&Rate<'a, T>> {
        let mut out = Vec::with_capacity(self.size());
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'r>(&'r self, out: &mut Vec<&'r Rate<'a, T>>) {
        out.push(self);
        for child in &self.children {
            child.collect_into(out);
        }
    }
}

impl<T: CompareItem> Rate<'_, T> {
    /// Identity of the pair (left key wins)
    pub fn key(&self) -> Option<String> {
        self.left
            .map(CompareItem::key)
            .or_else(|| self.right.map(CompareItem::key))
    }

    /// Item-level representation used inside sub-rate arrays
    pub fn to_object(&self) -> Value {
        json!({
            "type": self.kind,
            "key": self.key(),
            "left": self.left.map(CompareItem::to_object),
            "right": self.right.map(CompareItem::to_object),
            "total_rate": self.total_rate,
        })
    }
}
