use policy_compare::models::PolicyModel;
use policy_compare::rates::PROPERTIES_RATE;
use policy_compare::utils::ComparePolicyUtils;
use policy_compare::{Comparator, CompareOptions, CompareResult, PolicyComparator, RateType};
use proptest::prelude::*;
use serde_json::{json, Value};

const BLOCK_TYPES: &[&str] = &["interfaceActionBlock", "sendToGuardianBlock", "mintDocumentBlock"];

type Shape = Vec<(usize, String, Vec<(usize, String)>)>;

fn block(kind: usize, tag: &str, rule: &str, children: Vec<Value>) -> Value {
    json!({
        "blockType": BLOCK_TYPES[kind % BLOCK_TYPES.len()],
        "tag": tag,
        "rule": rule,
        "permissions": ["OWNER"],
        "children": children,
    })
}

fn policy(id: &str, shape: &Shape) -> PolicyModel {
    policy_with_rule(id, shape, None)
}

/// `changed` gives one top-level block a rule value no other block has
fn policy_with_rule(id: &str, shape: &Shape, changed: Option<usize>) -> PolicyModel {
    let children: Vec<Value> = shape
        .iter()
        .enumerate()
        .map(|(i, (kind, tag, nested))| {
            let nested = nested.iter().map(|(k, t)| block(*k, t, "r", Vec::new())).collect();
            let rule = if changed == Some(i) { "changed" } else { "r" };
            block(*kind, tag, rule, nested)
        })
        .collect();
    let record = json!({
        "id": id,
        "policyRoles": ["Registrant"],
        "config": { "blockType": "interfaceContainerBlock", "tag": "root", "children": children },
    });
    let mut model = PolicyModel::from_json(&record, &CompareOptions::default()).unwrap();
    model.update();
    model
}

fn shape_sized(size: std::ops::Range<usize>) -> impl Strategy<Value = Shape> {
    prop::collection::vec(
        (0usize..3, "[a-d]{1,2}", prop::collection::vec((0usize..3, "[a-d]{1,2}"), 0..3)),
        size,
    )
}

fn shape() -> impl Strategy<Value = Shape> {
    shape_sized(0..5)
}

/// Pre-order row of the `i`-th top-level block
fn top_level_row(shape: &Shape, i: usize) -> usize {
    1 + shape[..i].iter().map(|(_, _, nested)| 1 + nested.len()).sum::<usize>()
}

/// Data row count of every occurrence of a CSV section, in order
fn section_rows(csv: &str, title: &str) -> Vec<usize> {
    let lines: Vec<&str> = csv.lines().collect();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| **line == title)
        .map(|(i, _)| {
            // title, header, rows, blank line
            lines.get(i + 2..).unwrap_or_default().iter().take_while(|l| !l.is_empty()).count()
        })
        .collect()
}

fn count(result: &CompareResult, kind: RateType) -> usize {
    let label = kind.to_string();
    result
        .table("blocks")
        .unwrap()
        .rows()
        .iter()
        .filter(|row| row.get("type").and_then(Value::as_str) == Some(label.as_str()))
        .count()
}

proptest! {
    #[test]
    fn proptest_self_comparison_is_equal(s in shape()) {
        let a = policy("a", &s);
        let result = PolicyComparator::default().compare_pair(&a, &a);
        prop_assert_eq!(result.total, 100);
        let rows = result.table("blocks").unwrap().len();
        prop_assert_eq!(count(&result, RateType::Equal), rows);
    }

    #[test]
    fn proptest_added_removed_symmetry(left in shape(), right in shape()) {
        let a = policy("a", &left);
        let b = policy("b", &right);
        let comparator = PolicyComparator::default();
        let forward = comparator.compare_pair(&a, &b);
        let backward = comparator.compare_pair(&b, &a);
        prop_assert_eq!(count(&forward, RateType::Added), count(&backward, RateType::Removed));
        prop_assert_eq!(count(&forward, RateType::Removed), count(&backward, RateType::Added));
        prop_assert_eq!(count(&forward, RateType::Equal), count(&backward, RateType::Equal));
        prop_assert!(forward.total <= 100);

        for (l, r) in [(&a, &b), (&b, &a)] {
            let tree = ComparePolicyUtils::compare_blocks(&l.tree, &r.tree, &CompareOptions::default());
            for rate in tree.flatten() {
                if matches!(rate.kind, RateType::Added | RateType::Removed) {
                    prop_assert_eq!(rate.total_rate, 0);
                }
            }
        }
        for result in [&forward, &backward] {
            for row in result.table("blocks").unwrap().rows() {
                let kind = row.get("type").and_then(Value::as_str);
                if matches!(kind, Some("Added") | Some("Removed")) {
                    prop_assert_eq!(row.get("total_rate"), Some(&json!("-")));
                }
            }
        }
    }

    #[test]
    fn proptest_changed_property_never_raises_the_score(
        s in shape_sized(1..5),
        other in shape(),
        pick in any::<prop::sample::Index>(),
    ) {
        let i = pick.index(s.len());
        let a = policy("a", &s);
        let changed = policy_with_rule("a2", &s, Some(i));
        let comparator = PolicyComparator::default();

        let row = top_level_row(&s, i);
        let before = ComparePolicyUtils::compare_blocks(&a.tree, &a.tree, &CompareOptions::default());
        let after = ComparePolicyUtils::compare_blocks(&a.tree, &changed.tree, &CompareOptions::default());
        let before_rate = before.flatten()[row].rate_value(PROPERTIES_RATE);
        let after_rate = after.flatten()[row].rate_value(PROPERTIES_RATE);
        prop_assert_eq!(before_rate, Some(100));
        prop_assert!(after_rate.unwrap_or(100) < 100);
        prop_assert!(comparator.compare_pair(&a, &changed).total <= 100);

        let b = policy("b", &other);
        let base = comparator.compare_pair(&b, &a).total;
        let lowered = comparator.compare_pair(&b, &changed).total;
        prop_assert!(lowered <= base);
    }

    #[test]
    fn proptest_csv_sections_match_tables(first in shape(), second in shape(), third in shape()) {
        let models = [policy("a", &first), policy("b", &second), policy("c", &third)];
        let results = PolicyComparator::default().compare(&models).unwrap();
        let csv = PolicyComparator::table_to_csv(&results).unwrap();
        for (title, table) in [
            ("Policy Roles", "roles"),
            ("Policy Groups", "groups"),
            ("Policy Topics", "topics"),
            ("Policy Tokens", "tokens"),
            ("Policy Blocks", "blocks"),
        ] {
            let expected: Vec<usize> = results.iter().map(|r| r.table(table).unwrap().len()).collect();
            prop_assert_eq!(section_rows(&csv, title), expected);
        }
    }

    #[test]
    fn proptest_merge_keeps_every_row(first in shape(), second in shape(), third in shape()) {
        let models = [policy("a", &first), policy("b", &second), policy("c", &third)];
        let results = PolicyComparator::default().compare(&models).unwrap();
        let merged = PolicyComparator::merge_compare_results(&results).unwrap();
        let merged_rows = merged.table("blocks").unwrap().len();
        for result in &results {
            let pair = result.table("blocks").unwrap();
            prop_assert!(merged_rows >= pair.len());
            let added = count(result, RateType::Added);
            prop_assert!(merged_rows >= pair.len() - added);
        }
        prop_assert_eq!(merged.totals, results.iter().map(|r| r.total).collect::<Vec<_>>());
    }

    #[test]
    fn proptest_extra_child_lowers_score(s in shape(), tag in "[e-h]{3}") {
        let a = policy("a", &s);
        let mut extended = s.clone();
        extended.push((0, tag, Vec::new()));
        let b = policy("b", &extended);
        let result = PolicyComparator::default().compare_pair(&a, &b);
        prop_assert!(result.total < 100);
        prop_assert_eq!(count(&result, RateType::Added), 1);
    }
}
