use policy_compare::models::PolicyModel;
use policy_compare::{
    ChildrenLvl, Comparator, CompareError, CompareOptions, KeyLvl, MemoryStore, PolicyComparator,
    ToolComparator,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn policy(id: &str, children: Value) -> PolicyModel {
    let record = json!({
        "id": id,
        "name": format!("Policy {id}"),
        "config": { "blockType": "interfaceContainerBlock", "tag": "root", "children": children },
    });
    let mut model = PolicyModel::from_json(&record, &CompareOptions::default()).unwrap();
    model.update();
    model
}

fn rows(result: &policy_compare::CompareResult) -> Vec<(Value, Value)> {
    result
        .table("blocks")
        .unwrap()
        .rows()
        .iter()
        .map(|row| {
            let cell = |name| row.get(name).cloned().unwrap_or_default();
            (cell("type"), cell("total_rate"))
        })
        .collect()
}

#[test]
fn renamed_tag_keeps_full_score_unless_keys_are_exact() {
    let a = policy("a", json!([{ "blockType": "interfaceActionBlock", "tag": "approve" }]));
    let b = policy("b", json!([{ "blockType": "interfaceActionBlock", "tag": "approve_v2" }]));

    let loose = PolicyComparator::default().compare_pair(&a, &b);
    assert_eq!(rows(&loose)[1], (json!("Partly"), json!("100%")));
    assert_eq!(loose.total, 100);

    let exact = CompareOptions {
        key_lvl: KeyLvl::Exact,
        ..CompareOptions::default()
    };
    let strict = PolicyComparator::new(exact).compare_pair(&a, &b);
    assert_eq!(strict.table("blocks").unwrap().rows()[1].get("type"), Some(&json!("Partly")));
    assert!(strict.total < 100);
}

#[test]
fn removed_child_is_reported_under_its_parent() {
    let a = policy(
        "a",
        json!([{
            "blockType": "interfaceStepBlock",
            "tag": "steps",
            "children": [
                { "blockType": "requestVcDocumentBlock", "tag": "request" },
                { "blockType": "sendToGuardianBlock", "tag": "save" }
            ]
        }]),
    );
    let b = policy(
        "b",
        json!([{
            "blockType": "interfaceStepBlock",
            "tag": "steps",
            "children": [{ "blockType": "requestVcDocumentBlock", "tag": "request" }]
        }]),
    );
    let result = PolicyComparator::default().compare_pair(&a, &b);
    let table = result.table("blocks").unwrap();
    let last = &table.rows()[3];
    assert_eq!(last.get("lvl"), Some(&json!(3)));
    assert_eq!(last.get("type"), Some(&json!("Removed")));
    assert_eq!(last.get("left_tag"), Some(&json!("save")));
    assert_eq!(last.get("right_tag"), None);
    assert_eq!(last.get("total_rate"), Some(&json!("-")));
    assert!(result.total < 100);

    let roots_only = CompareOptions {
        child_lvl: ChildrenLvl::None,
        ..CompareOptions::default()
    };
    let shallow = PolicyComparator::new(roots_only).compare_pair(&a, &b);
    assert_eq!(shallow.table("blocks").unwrap().len(), 1);
}

#[test]
fn csv_report_layout() {
    let a = policy("a", json!([{ "blockType": "interfaceActionBlock", "tag": "x" }]));
    let b = policy("b", json!([]));
    let results = PolicyComparator::default().compare(&[a, b]).unwrap();
    let csv = PolicyComparator::table_to_csv(&results).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Policy 1");
    assert!(lines[1].starts_with("Policy ID,Policy Name"));
    assert!(lines[2].starts_with("a,Policy a"));
    assert_eq!(lines[3], "");
    assert_eq!(lines[4], "Policy 2");
    assert!(lines.contains(&"Policy Blocks"));
    assert!(lines.last().unwrap().starts_with("Total,"));
}

#[test]
fn a_single_model_cannot_be_compared() {
    let a = policy("a", json!([]));
    assert!(matches!(
        PolicyComparator::default().compare(&[a]),
        Err(CompareError::NotEnoughModels(1))
    ));
}

fn tool(id: &str, artifact: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Tool {id}"),
        "config": {
            "blockType": "tool",
            "inputEvents": [{ "name": "start" }],
            "children": [{
                "blockType": "customLogicBlock",
                "tag": "calc",
                "artifacts": [{ "uuid": artifact, "name": "calc.js" }]
            }]
        }
    })
}

#[tokio::test]
async fn tool_artifacts_are_compared_by_content() {
    let mut store = MemoryStore::new();
    store
        .add_tool(tool("t1", "u1"))
        .add_tool(tool("t2", "u2"))
        .add_tool(tool("t3", "u3"))
        .add_artifact(json!({ "uuid": "u1", "name": "calc.js", "toolId": "t1" }), "x = 1")
        .add_artifact(json!({ "uuid": "u2", "name": "calc.js", "toolId": "t2" }), "x = 2")
        .add_artifact(json!({ "uuid": "u3", "name": "calc.js", "toolId": "t3" }), "x = 1");

    let options = CompareOptions::default();
    let mut models = Vec::new();
    for id in ["t1", "t2", "t3"] {
        models.push(ToolComparator::create_model_by_id(&store, id, &options).await.unwrap());
    }
    let results = ToolComparator::new(options).compare(&models).unwrap();
    let artifact_rate = |i: usize| {
        let row = &results[i].table("blocks").unwrap().rows()[1];
        row.get("artifacts_rate").cloned()
    };
    assert_eq!(artifact_rate(0), Some(json!("0%")));
    assert_eq!(artifact_rate(1), Some(json!("100%")));
    assert!(results[0].total < results[1].total);
}

#[tokio::test]
async fn missing_artifact_file_fails_the_load() {
    let mut store = MemoryStore::new();
    store
        .add_tool(tool("t1", "u1"))
        .add_artifact_meta(json!({ "uuid": "u1", "name": "calc.js", "toolId": "t1" }));
    let err = ToolComparator::create_model_by_id(&store, "t1", &CompareOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CompareError::MissingArtifactFile(uuid) if uuid == "u1"));
}

#[test]
fn artifact_without_uuid_matches_itself() {
    let a = policy(
        "a",
        json!([{ "blockType": "customLogicBlock", "tag": "calc", "artifacts": [{ "name": "calc.js" }] }]),
    );
    let result = PolicyComparator::default().compare_pair(&a, &a);
    assert_eq!(result.total, 100);
    let row = &result.table("blocks").unwrap().rows()[1];
    assert_eq!(row.get("type"), Some(&json!("Equal")));
    assert_eq!(row.get("artifacts_rate"), Some(&json!("100%")));
}
