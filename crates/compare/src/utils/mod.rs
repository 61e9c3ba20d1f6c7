//! Alignment, scoring and merge algorithms.

mod compare;
mod merge;
mod multi;
mod policy;

pub use compare::CompareUtils;
pub use merge::{MergeUtils, Pair};
pub use multi::{CellSource, MergeLayout, MergedRow, MultiCompareUtils};
pub use policy::ComparePolicyUtils;
