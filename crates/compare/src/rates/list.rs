use super::{CompareItem, Rate, SubRate};
use crate::models::{ArtifactModel, EventModel, PropertyModel};
use crate::options::CompareOptions;
use crate::utils::{CompareUtils, MergeUtils};

/// Properties aligned by path; ignored properties take no part
pub fn properties_rate(
    left: &[PropertyModel],
    right: &[PropertyModel],
    options: &CompareOptions,
) -> SubRate {
    let left: Vec<&PropertyModel> = left.iter().filter(|p| !p.ignored(options)).collect();
    let right: Vec<&PropertyModel> = right.iter().filter(|p| !p.ignored(options)).collect();
    let rates: Vec<Rate<'_, PropertyModel>> = MergeUtils::align_by_key(&left, &right, |p| p.path.clone())
        .into_iter()
        .map(|(l, r)| match (l.copied(), r.copied()) {
            (Some(l), Some(r)) => Rate::binary(l, r, l.equal(r, options)),
            (l, r) => Rate::new(l, r),
        })
        .collect();
    SubRate::from_rates(&rates)
}

/// Permissions compared as a set of role names
pub fn permissions_rate(left: &[String], right: &[String]) -> SubRate {
    let rates: Vec<Rate<'_, String>> = MergeUtils::align_by_key(left, right, String::clone)
        .into_iter()
        .map(|(l, r)| Rate::new(l, r))
        .collect();
    SubRate::from_rates(&rates)
}

/// Events aligned by position; a pair scores its share of matching fields
pub fn events_rate(left: &[EventModel], right: &[EventModel]) -> SubRate {
    let rates: Vec<Rate<'_, EventModel>> = MergeUtils::align_by_index(left, right)
        .into_iter()
        .map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) => {
                let equal = l.equal_fields(r);
                let total = l.fields().len();
                let mut rate = Rate::binary(l, r, equal == total);
                rate.total_rate = CompareUtils::share_rate(equal, total);
                rate
            }
            (l, r) => Rate::new(l, r),
        })
        .collect();
    SubRate::from_rates(&rates)
}

/// Artifacts aligned by name; a pair is equal only for identical content
pub fn artifacts_rate(left: &[ArtifactModel], right: &[ArtifactModel]) -> SubRate {
    let rates: Vec<Rate<'_, ArtifactModel>> = MergeUtils::align_by_key(left, right, ArtifactModel::key)
        .into_iter()
        .map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) => Rate::binary(l, r, l.same_content(r)),
            (l, r) => Rate::new(l, r),
        })
        .collect();
    SubRate::from_rates(&rates)
}
