use super::list::properties_rate;
use super::{Rate, DOCUMENTS_RATE, OPTIONS_RATE};
use crate::models::DocumentModel;
use crate::options::CompareOptions;

/// Score a document pair by body fields and options, with equal weight
pub fn document_rate<'a>(
    left: Option<&'a DocumentModel>,
    right: Option<&'a DocumentModel>,
    options: &CompareOptions,
) -> Rate<'a, DocumentModel> {
    let mut rate = Rate::new(left, right);
    if let (Some(l), Some(r)) = (left, right) {
        rate.set_sub_rate(DOCUMENTS_RATE, properties_rate(&l.fields, &r.fields, options));
        rate.set_sub_rate(OPTIONS_RATE, properties_rate(&l.options, &r.options, options));
        rate.finish(&[(DOCUMENTS_RATE, 1), (OPTIONS_RATE, 1)], l.key == r.key);
    }
    rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateType;
    use serde_json::json;

    #[test]
    fn test_status_change_halves_options() {
        let doc = |status: &str| {
            DocumentModel::from_json(&json!({
                "schema": "#s",
                "option": { "status": status },
                "document": { "credentialSubject": [{ "x": 1 }] }
            }))
        };
        let (a, b) = (doc("NEW"), doc("APPROVED"));
        let rate = document_rate(Some(&a), Some(&b), &CompareOptions::default());
        assert_eq!(rate.rate_value(DOCUMENTS_RATE), Some(100));
        assert_eq!(rate.rate_value(OPTIONS_RATE), Some(0));
        assert_eq!(rate.total_rate, 50);
        assert_eq!(rate.kind, RateType::Partly);
    }
}
