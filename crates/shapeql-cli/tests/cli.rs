//! CLI tests for shapeql: usage, help, catalog compilation and error handling.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn shapeql() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("shapeql").unwrap();
    cmd.env_remove("SHAPEQL_INDENT").env_remove("RUST_LOG");
    cmd
}

const SHOP: &str = r#"{
    "namespace": "main",
    "root": "Query",
    "shapes": {
        "Query": { "fields": [
            { "name": "items", "tag": "items(first: $first:Int! = 10)", "type": "[Item]" },
            { "name": "featured", "type": "Item" }
        ] },
        "Item": { "fields": [ { "name": "id", "type": "ID!" } ] }
    }
}"#;

fn catalog(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ── Usage and help ──────────────────────────────────────────────────────────

#[test]
fn usage_prints_command_reference() {
    shapeql()
        .arg("usage")
        .assert()
        .success()
        .stdout(predicate::str::contains("COMMANDS"))
        .stdout(predicate::str::contains("compile"))
        .stdout(predicate::str::contains("variables"))
        .stdout(predicate::str::contains("fragments"))
        .stdout(predicate::str::contains("--indent"));
}

#[test]
fn usage_shows_indent_env_when_set() {
    shapeql()
        .env("SHAPEQL_INDENT", "    ")
        .arg("usage")
        .assert()
        .success()
        .stdout(predicate::str::contains("(set:"));
}

#[test]
fn help_flag_shows_help() {
    shapeql()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shapeql"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_shows_version() {
    shapeql()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shapeql"));
}

#[test]
fn unknown_command_fails() {
    shapeql().arg("frobnicate").assert().failure();
}

// ── compile ─────────────────────────────────────────────────────────────────

#[test]
fn compile_prints_document_with_fragment_and_variables() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.json", SHOP);
    shapeql()
        .args(["--format", "human", "compile"])
        .arg(&path)
        .args(["--name", "Shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fragment MainItem on Item{\n  id\n}\n"))
        .stdout(predicate::str::contains(
            "query Shop($first: Int! = 10) {\n  items(first: $first){ ...MainItem }\n  featured{ ...MainItem }\n}",
        ));
}

#[test]
fn compile_mutation() {
    let dir = TempDir::new().unwrap();
    let path = catalog(
        &dir,
        "touch.toml",
        r#"
root = "Mutation"

[[shapes.Mutation.fields]]
name = "touch"
tag = "touch(id: $id:ID!)"
"#,
    );
    shapeql()
        .args(["--format", "human", "compile", "--mutation"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "mutation($id: ID!) {\n  touch(id: $id)\n}",
        ));
}

#[test]
fn compile_json_output() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.json", SHOP);
    let output = shapeql()
        .args(["--format", "json", "compile"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["document"].as_str().unwrap().starts_with("fragment MainItem"));
    assert_eq!(
        json["body"],
        "{\n  items(first: $first){ ...MainItem }\n  featured{ ...MainItem }\n}"
    );
    assert_eq!(json["variables"][0]["name"], "first");
    assert_eq!(json["variables"][0]["default"], 10);
    assert_eq!(json["fragments"][0]["target_type"], "Item");
}

#[test]
fn indent_flag_overrides_env() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.json", SHOP);
    shapeql()
        .env("SHAPEQL_INDENT", "    ")
        .args(["--format", "human", "--indent", "\\t", "compile"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("{\n\tid\n}"));
}

#[test]
fn indent_from_env() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.json", SHOP);
    shapeql()
        .env("SHAPEQL_INDENT", "    ")
        .args(["--format", "human", "compile"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("{\n    id\n}"));
}

#[test]
fn verbose_logs_to_stderr() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.json", SHOP);
    shapeql()
        .args(["--format", "human", "--verbose", "compile"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("registered fragment"));
}

// ── variables / fragments ───────────────────────────────────────────────────

#[test]
fn variables_table() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.json", SHOP);
    shapeql()
        .args(["--format", "human", "variables"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("$first"))
        .stdout(predicate::str::contains("Int!"))
        .stdout(predicate::str::contains("used at"));
}

#[test]
fn variables_empty() {
    let dir = TempDir::new().unwrap();
    let path = catalog(
        &dir,
        "plain.json",
        r#"{ "root": "Q", "shapes": { "Q": { "fields": [ { "name": "id" } ] } } }"#,
    );
    shapeql()
        .args(["--format", "human", "variables"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No results."));
}

#[test]
fn fragments_json_has_bodies() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.json", SHOP);
    let output = shapeql()
        .args(["--format", "json", "fragments"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "MainItem");
    assert_eq!(json[0]["body"], "fragment MainItem on Item{\n  id\n}");
}

#[test]
fn fragments_table() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.json", SHOP);
    shapeql()
        .args(["--format", "human", "fragments"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("MainItem"))
        .stdout(predicate::str::contains("Item"));
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn missing_file_fails() {
    shapeql()
        .args(["compile", "/nonexistent/shop.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Cannot read"));
}

#[test]
fn unsupported_extension_fails() {
    let dir = TempDir::new().unwrap();
    let path = catalog(&dir, "shop.yaml", SHOP);
    shapeql()
        .arg("compile")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported catalog format"));
}

#[test]
fn cyclic_catalog_fails() {
    let dir = TempDir::new().unwrap();
    let path = catalog(
        &dir,
        "cycle.json",
        r#"{ "namespace": "t", "root": "Node", "shapes": { "Node": { "fields": [
            { "name": "id" }, { "name": "next", "type": "Node" } ] } } }"#,
    );
    shapeql()
        .arg("compile")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cyclic reference: t.Node -> t.Node"));
}

#[test]
fn untyped_variable_fails_at_assembly() {
    let dir = TempDir::new().unwrap();
    let path = catalog(
        &dir,
        "untyped.json",
        r#"{ "root": "Q", "shapes": { "Q": { "fields": [
            { "name": "list", "tag": "list(query: $)" } ] } } }"#,
    );
    shapeql()
        .args(["--format", "human", "compile"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Variable $list_query has no declared type"));
}

#[test]
fn bad_annotation_reports_field() {
    let dir = TempDir::new().unwrap();
    let path = catalog(
        &dir,
        "bad.json",
        r#"{ "root": "Q", "shapes": { "Q": { "fields": [
            { "name": "items", "tag": "items(first: 1" } ] } } }"#,
    );
    shapeql()
        .arg("compile")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid annotation on field [items] of Q"));
}
