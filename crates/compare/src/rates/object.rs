use super::list::properties_rate;
use super::{Rate, PROPERTIES_RATE};
use crate::models::ObjectModel;
use crate::options::CompareOptions;

/// Score a role/group/topic/token/variable/event pair by its properties
pub fn object_rate<'a>(
    left: Option<&'a ObjectModel>,
    right: Option<&'a ObjectModel>,
    options: &CompareOptions,
) -> Rate<'a, ObjectModel> {
    let mut rate = Rate::new(left, right);
    if let (Some(l), Some(r)) = (left, right) {
        rate.set_sub_rate(
            PROPERTIES_RATE,
            properties_rate(&l.properties, &r.properties, options),
        );
        rate.finish(&[(PROPERTIES_RATE, 1)], l.key == r.key);
    }
    rate
}
