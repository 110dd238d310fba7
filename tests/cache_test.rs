mod common;

use common::{HermesTest, sample_issues};

#[test]
fn test_cache_status_before_import() {
    let hermes = HermesTest::new();

    let output = hermes.run_json(&["cache", "status"]);
    assert_eq!(output["populated"], false);

    let text = hermes.run_success(&["cache", "status"]);
    assert!(text.contains("hermes pull"));
}

#[test]
fn test_cache_import_and_status() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    let output = hermes.run_json(&["cache", "status"]);
    assert_eq!(output["populated"], true);
    assert_eq!(output["issue_count"], 4);
    assert_eq!(output["open_count"], 3);

    assert!(hermes.root().join("cache/index.json").exists());
    let cached = hermes.read_cached_issue(42);
    assert_eq!(cached["body"], "");
    assert_eq!(cached["labels"], serde_json::json!(["feature"]));
}

#[test]
fn test_cache_import_replaces_existing_issue() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());
    hermes.seed_cache(&serde_json::json!([
        { "id": 42, "title": "Add dark mode (v2)", "state": "closed" }
    ]));

    let cached = hermes.read_cached_issue(42);
    assert_eq!(cached["title"], "Add dark mode (v2)");
    assert_eq!(cached["state"], "closed");

    let output = hermes.run_json(&["cache", "status"]);
    assert_eq!(output["issue_count"], 4);
}

#[test]
fn test_cache_import_keeps_unsynced_edits() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    hermes.run_success(&["mutate", "7", "--state", "closed"]);
    hermes.run_success(&["labels", "7", "p0"]);

    hermes.seed_cache(&sample_issues());

    let cached = hermes.read_cached_issue(7);
    assert_eq!(cached["state"], "closed");
    assert_eq!(cached["labels"], serde_json::json!(["p0"]));
    assert_eq!(cached["body"], "stack trace");

    assert_eq!(hermes.pending_files("updates"), vec!["7.json"]);
    assert_eq!(hermes.pending_files("labels"), vec!["7.json"]);

    let search = hermes.run_json(&["search", "login", "--labels", "p0"]);
    assert_eq!(search.as_array().unwrap().len(), 1);
}

#[test]
fn test_cache_import_rejects_bad_input() {
    let hermes = HermesTest::new();

    hermes.run_failure(&["cache", "import", "missing.json"]);

    std::fs::write(hermes.temp_dir.path().join("bad.json"), "{ not json").unwrap();
    hermes.run_failure(&["cache", "import", "bad.json"]);

    std::fs::write(
        hermes.temp_dir.path().join("zero.json"),
        r#"[{ "id": 0, "title": "nope" }]"#,
    )
    .unwrap();
    hermes.run_failure(&["cache", "import", "zero.json"]);

    assert!(!hermes.root().join("cache/index.json").exists());
}
