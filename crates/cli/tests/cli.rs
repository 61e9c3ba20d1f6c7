use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write(root: &Path, rel: &str, value: &Value) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn policy(id: &str, tags: &[&str]) -> Value {
    let children: Vec<Value> = tags
        .iter()
        .map(|tag| {
            json!({
                "blockType": "interfaceStepBlock",
                "tag": tag,
                "children": [
                    { "blockType": "requestVcDocumentBlock", "tag": format!("{tag}_request") },
                    { "blockType": "sendToGuardianBlock", "tag": format!("{tag}_save") }
                ]
            })
        })
        .collect();
    json!({
        "id": id,
        "name": format!("Policy {id}"),
        "policyRoles": ["Registrant"],
        "config": { "blockType": "interfaceContainerBlock", "tag": "root", "children": children }
    })
}

fn store() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(root, "policies/a.json", &policy("a", &["first", "second"]));
    write(root, "policies/b.json", &policy("b", &["first"]));
    write(root, "policies/c.json", &policy("c", &["first", "second"]));
    write(
        root,
        "schemas/s1.json",
        &json!({ "id": "s1", "name": "Project", "document": { "properties": { "name": { "type": "string" } } } }),
    );
    write(
        root,
        "schemas/s2.json",
        &json!({ "id": "s2", "name": "Project", "document": { "properties": { "name": { "type": "number" } } } }),
    );
    temp
}

#[allow(deprecated)]
fn cli(store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("policy-compare").expect("binary");
    cmd.arg("--quiet").arg("--store").arg(store);
    cmd
}

fn run_json(store: &Path, args: &[&str]) -> Value {
    let output = cli(store).args(args).output().expect("command run");
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn compare_policies_as_json() {
    let temp = store();
    let results = run_json(temp.path(), &["compare", "policy", "a", "b", "c"]);
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0]["total"].as_u64().unwrap() < 100);
    assert_eq!(results[1]["total"], 100);
    assert_eq!(results[0]["left"]["id"], "a");
    assert!(results[0]["blocks"]["report"].is_array());
}

#[test]
fn compare_policies_merged() {
    let temp = store();
    let merged = run_json(temp.path(), &["compare", "policy", "a", "b", "c", "--merge"]);
    assert_eq!(merged["size"], 3);
    assert_eq!(merged["totals"].as_array().unwrap().len(), 2);
}

#[test]
fn compare_policies_as_csv() {
    let temp = store();
    cli(temp.path())
        .args(["compare", "policy", "a", "b", "--csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Policy 1\n"))
        .stdout(predicate::str::contains("Policy Blocks\n"));
}

#[test]
fn compare_schemas_with_options_file() {
    let temp = store();
    let options = temp.path().join("options.toml");
    fs::write(&options, "prop_lvl = \"none\"\n").unwrap();

    let strict = run_json(temp.path(), &["compare", "schema", "s1", "s2"]);
    assert!(strict[0]["total"].as_u64().unwrap() < 100);

    let loose = run_json(
        temp.path(),
        &["compare", "schema", "s1", "s2", "--options", options.to_str().unwrap()],
    );
    assert_eq!(loose[0]["total"], 100);
}

#[test]
fn compare_needs_two_ids() {
    let temp = store();
    cli(temp.path()).args(["compare", "policy", "a"]).assert().failure();
}

#[test]
fn unknown_policy_fails() {
    let temp = store();
    cli(temp.path())
        .args(["compare", "policy", "a", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn search_by_tag() {
    let temp = store();
    let chains = run_json(temp.path(), &["search", "a", "--filter", "b", "--tag", "first"]);
    let chains = chains.as_array().unwrap();
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0]["tag"], "first");
    assert!(chains[0]["hash"].as_u64().unwrap() >= chains[1]["hash"].as_u64().unwrap());

    let limited = run_json(temp.path(), &["search", "a", "--filter", "b", "--path", "0", "--limit", "1"]);
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[test]
fn search_several_policies() {
    let temp = store();
    let found = run_json(temp.path(), &["search", "a", "c", "--filter", "b", "--tag", "first"]);
    let ids: Vec<&str> = found.as_array().unwrap().iter().filter_map(|m| m["id"].as_str()).collect();
    assert_eq!(ids.len(), 2);
}

#[test]
fn hash_policies() {
    let temp = store();
    let report = run_json(temp.path(), &["hash", "a", "c", "b"]);
    let policies = report["policies"].as_array().unwrap();
    assert_eq!(policies.len(), 3);
    assert_eq!(policies[0]["hash"], policies[1]["hash"]);
    let matches = report["matches"].as_array().unwrap();
    assert_eq!(matches[0]["id"], "c");
    assert_eq!(matches[0]["rate"], 100);
}
