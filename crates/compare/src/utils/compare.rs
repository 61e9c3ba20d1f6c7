use crate::rates::Rate;
use crate::report::{Csv, ReportTable};

/// Score arithmetic shared by rates and comparators
pub struct CompareUtils;

impl CompareUtils {
    /// Floored percentage of `equal` out of `total`; 100 for an empty list
    pub fn share_rate(equal: usize, total: usize) -> u32 {
        if total == 0 {
            return 100;
        }
        ((equal.min(total) * 100) / total) as u32
    }

    /// Rounded mean of section totals; 100 when there are none
    pub fn calc_total_rate(rates: &[u32]) -> u32 {
        Self::calc_weighted_rate(&rates.iter().map(|&r| (r, 1)).collect::<Vec<_>>())
    }

    /// Weighted mean of `(rate, weight)` pairs, rounded half-up
    pub fn calc_weighted_rate(rates: &[(u32, u32)]) -> u32 {
        let weights: u64 = rates.iter().map(|&(_, w)| u64::from(w)).sum();
        if weights == 0 {
            return 100;
        }
        let sum: u64 = rates
            .iter()
            .map(|&(r, w)| u64::from(r) * u64::from(w))
            .sum();
        ((2 * sum + weights) / (2 * weights)) as u32
    }

    /// Floored mean of row totals for flat lists; 100 when empty
    pub fn flat_total<T>(rates: &[Rate<'_, T>]) -> u32 {
        Self::rows_total(rates)
    }

    /// [`Self::flat_total`] over flattened tree rows
    pub fn rows_total<'r, 'a: 'r, T: 'a>(rates: impl IntoIterator<Item = &'r Rate<'a, T>>) -> u32 {
        Self::floor_mean(rates.into_iter().map(|r| r.total_rate))
    }

    /// Floored mean after bucketing each row into 100 / 50 / 0
    pub fn stepped_total<'r, 'a: 'r, T: 'a>(rates: impl IntoIterator<Item = &'r Rate<'a, T>>) -> u32 {
        Self::floor_mean(rates.into_iter().map(|r| match r.total_rate {
            r if r > 99 => 100,
            r if r > 50 => 50,
            _ => 0,
        }))
    }

    /// Mean of every node total in the tree, each weighted by its subtree size
    pub fn tree_total<T>(root: &Rate<'_, T>) -> u32 {
        Self::forest_total(std::slice::from_ref(root))
    }

    /// [`Self::tree_total`] over several roots; 100 for an empty forest
    pub fn forest_total<T>(roots: &[Rate<'_, T>]) -> u32 {
        let weighted: Vec<(u32, u32)> = roots
            .iter()
            .flat_map(Rate::flatten)
            .map(|node| (node.total_rate, node.size() as u32))
            .collect();
        Self::calc_weighted_rate(&weighted)
    }

    /// Append a table as one header line plus one line per row.
    /// Only labelled columns are exported.
    pub fn table_to_csv(csv: &mut Csv, table: &ReportTable) {
        for column in table.exported_columns() {
            csv.add(&column.label);
        }
        csv.add_line();
        for row in table.rows() {
            for column in table.exported_columns() {
                csv.add_value(row.get(&column.name));
            }
            csv.add_line();
        }
    }

    fn floor_mean(values: impl Iterator<Item = u32>) -> u32 {
        let (sum, count) = values.fold((0u64, 0u64), |(s, c), v| (s + u64::from(v), c + 1));
        if count == 0 {
            100
        } else {
            (sum / count) as u32
        }
    }
}
