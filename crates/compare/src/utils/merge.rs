use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// One aligned left/right slot; either side may be missing
pub type Pair<'a, T> = (Option<&'a T>, Option<&'a T>);

/// Sequence alignment helpers
pub struct MergeUtils;

impl MergeUtils {
    /// Pair items position by position; the longer side's tail is left unpaired
    pub fn align_by_index<'a, T>(left: &'a [T], right: &'a [T]) -> Vec<Pair<'a, T>> {
        (0..left.len().max(right.len()))
            .map(|i| (left.get(i), right.get(i)))
            .collect()
    }

    /// Pair items by identity key.
    ///
    /// Output follows left order, followed by right-only items in right order.
    /// With duplicate keys the right item at the same position wins, otherwise
    /// the first unused one.
    pub fn align_by_key<'a, T, K, F>(left: &'a [T], right: &'a [T], key: F) -> Vec<Pair<'a, T>>
    where
        K: Eq + Hash + Debug,
        F: Fn(&T) -> K,
    {
        let mut positions: HashMap<K, Vec<usize>> = HashMap::new();
        for (j, item) in right.iter().enumerate() {
            positions.entry(key(item)).or_default().push(j);
        }

        let mut used = vec![false; right.len()];
        let mut pairs = Vec::with_capacity(left.len().max(right.len()));
        for (i, item) in left.iter().enumerate() {
            let k = key(item);
            let matched = positions.get(&k).and_then(|slots| {
                if slots.len() > 1 {
                    log::warn!("Duplicate key {k:?}: aligning by position");
                }
                let mut free = slots.iter().copied().filter(|&j| !used[j]);
                let first = free.clone().next();
                free.find(|&j| j == i).or(first)
            });
            match matched {
                Some(j) => {
                    used[j] = true;
                    pairs.push((Some(item), Some(&right[j])));
                }
                None => pairs.push((Some(item), None)),
            }
        }
        for (j, item) in right.iter().enumerate() {
            if !used[j] {
                pairs.push((None, Some(item)));
            }
        }
        pairs
    }
}
