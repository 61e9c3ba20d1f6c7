use super::list::properties_rate;
use super::{Rate, PROPERTIES_RATE};
use crate::models::FieldModel;
use crate::options::CompareOptions;

/// Score a schema field pair by its property list; children are handled by
/// the caller.
pub fn field_rate<'a>(
    left: Option<&'a FieldModel>,
    right: Option<&'a FieldModel>,
    options: &CompareOptions,
) -> Rate<'a, FieldModel> {
    let mut rate = Rate::new(left, right);
    if let (Some(l), Some(r)) = (left, right) {
        rate.set_sub_rate(
            PROPERTIES_RATE,
            properties_rate(&l.prop_list(), &r.prop_list(), options),
        );
        rate.finish(&[(PROPERTIES_RATE, 1)], l.name == r.name);
    }
    rate
}
