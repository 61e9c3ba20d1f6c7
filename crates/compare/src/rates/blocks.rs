use super::list::{artifacts_rate, events_rate, permissions_rate, properties_rate};
use super::{
    Rate, SubRate, ARTIFACTS_RATE, EVENTS_RATE, INDEX_RATE, KEY_RATE, PERMISSIONS_RATE,
    PROPERTIES_RATE,
};
use crate::models::BlockModel;
use crate::options::{CompareOptions, EventsLvl, KeyLvl, PropertiesLvl};

/// Weights of the block sub-rates in the node total
pub const BLOCK_WEIGHTS: &[(&str, u32)] = &[
    (INDEX_RATE, 4),
    (PROPERTIES_RATE, 3),
    (KEY_RATE, 2),
    (PERMISSIONS_RATE, 1),
    (EVENTS_RATE, 1),
    (ARTIFACTS_RATE, 1),
];

/// Score one block pair, without descending into children.
///
/// `index` is 100 for the same type at the same position, 50 for the same
/// type elsewhere, 0 otherwise. Sub-rates disabled by the options are not
/// computed and do not count towards the total.
pub fn block_rate<'a>(
    left: Option<&'a BlockModel>,
    right: Option<&'a BlockModel>,
    options: &CompareOptions,
) -> Rate<'a, BlockModel> {
    let mut rate = Rate::new(left, right);
    let (Some(l), Some(r)) = (left, right) else {
        return rate;
    };

    let index = match (l.block_type == r.block_type, l.index == r.index) {
        (true, true) => 100,
        (true, false) => 50,
        (false, _) => 0,
    };
    rate.set_sub_rate(INDEX_RATE, SubRate::scored(index));
    if options.prop_lvl != PropertiesLvl::None {
        rate.set_sub_rate(
            PROPERTIES_RATE,
            properties_rate(&l.properties, &r.properties, options),
        );
    }
    if options.key_lvl == KeyLvl::Exact {
        let key = if l.tag == r.tag { 100 } else { 0 };
        rate.set_sub_rate(KEY_RATE, SubRate::scored(key));
    }
    rate.set_sub_rate(
        PERMISSIONS_RATE,
        permissions_rate(&l.permissions, &r.permissions),
    );
    if options.event_lvl == EventsLvl::All {
        rate.set_sub_rate(EVENTS_RATE, events_rate(&l.events, &r.events));
    }
    rate.set_sub_rate(ARTIFACTS_RATE, artifacts_rate(&l.artifacts, &r.artifacts));

    rate.finish(BLOCK_WEIGHTS, l.tag == r.tag);
    rate
}
