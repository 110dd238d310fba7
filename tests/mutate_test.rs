mod common;

use common::{HermesTest, sample_issues};

#[test]
fn test_mutate_updates_cache_and_queues_one_entry() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    let output = hermes.run_json(&["mutate", "7", "--state", "closed"]);
    assert_eq!(output["action"], "update_queued");
    assert_eq!(output["fields"], serde_json::json!(["state"]));

    let cached = hermes.read_cached_issue(7);
    assert_eq!(cached["state"], "closed");
    assert_eq!(cached["title"], "Crash on login");

    assert_eq!(hermes.pending_files("updates"), vec!["7.json"]);
    let entry = hermes.read_pending("updates", "7.json");
    assert_eq!(entry["id"], 7);
    assert_eq!(entry["state"], "closed");
    assert!(entry.get("title").is_none());
}

#[test]
fn test_second_mutate_replaces_pending_update() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    hermes.run_success(&["mutate", "7", "--state", "closed"]);
    hermes.run_success(&["mutate", "7", "--title", "Crash on logout"]);

    assert_eq!(hermes.pending_files("updates"), vec!["7.json"]);
    let entry = hermes.read_pending("updates", "7.json");
    assert_eq!(entry["title"], "Crash on logout");
    assert!(entry.get("state").is_none());

    // The cache keeps both local edits.
    let cached = hermes.read_cached_issue(7);
    assert_eq!(cached["title"], "Crash on logout");
    assert_eq!(cached["state"], "closed");
}

#[test]
fn test_mutate_labels_flag() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    hermes.run_success(&["mutate", "42", "--labels", "feature, ui"]);

    let cached = hermes.read_cached_issue(42);
    assert_eq!(cached["labels"], serde_json::json!(["feature", "ui"]));
}

#[test]
fn test_mutate_uncached_issue_is_still_queued() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    hermes.run_success(&["mutate", "999", "--body", "from the field"]);

    assert_eq!(hermes.pending_files("updates"), vec!["999.json"]);
    assert!(!hermes.root().join("cache/issues/999.json").exists());
}

#[test]
fn test_mutate_rejects_invalid_arguments() {
    let hermes = HermesTest::new();

    hermes.run_failure(&["mutate", "7"]);
    hermes.run_failure(&["mutate", "0", "--title", "x"]);
    hermes.run_failure(&["mutate", "7", "--title", "   "]);
    hermes.run_failure(&["mutate", "7", "--state", "merged"]);
    hermes.run_failure(&["mutate", "seven", "--title", "x"]);

    assert!(hermes.pending_files("updates").is_empty());
}

#[test]
fn test_two_comments_are_both_queued() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    hermes.run_success(&["comment", "7", "first", "look"]);
    hermes.run_success(&["comment", "7", "second look"]);

    let files = hermes.pending_files("comments");
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.starts_with("7-")));

    let bodies: Vec<String> = files
        .iter()
        .map(|f| hermes.read_pending("comments", f)["body"].as_str().unwrap().to_string())
        .collect();
    assert!(bodies.contains(&"first look".to_string()));
    assert!(bodies.contains(&"second look".to_string()));

    // Comments never touch the cache.
    assert_eq!(hermes.read_cached_issue(7)["body"], "stack trace");
}

#[test]
fn test_comment_rejects_empty_body() {
    let hermes = HermesTest::new();
    hermes.run_failure(&["comment", "7", ""]);
    hermes.run_failure(&["comment", "7"]);
    assert!(hermes.pending_files("comments").is_empty());
}

#[test]
fn test_labels_command_replaces_labels() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    hermes.run_success(&["labels", "7", "bug,p0"]);
    hermes.run_success(&["labels", "7", "bug, p2"]);

    assert_eq!(hermes.pending_files("labels"), vec!["7.json"]);
    let entry = hermes.read_pending("labels", "7.json");
    assert_eq!(entry["labels"], serde_json::json!(["bug", "p2"]));
    assert_eq!(
        hermes.read_cached_issue(7)["labels"],
        serde_json::json!(["bug", "p2"])
    );
}

#[test]
fn test_labels_command_can_clear_labels() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    hermes.run_success(&["labels", "42"]);

    let entry = hermes.read_pending("labels", "42.json");
    assert_eq!(entry["labels"], serde_json::json!([]));
}

#[test]
fn test_hermes_root_override() {
    let hermes = HermesTest::new();

    let output = hermes.run_with_env(&["comment", "3", "hello"], &[("HERMES_ROOT", "elsewhere")]);
    assert!(output.status.success());

    let dir = hermes.temp_dir.path().join("elsewhere/pending/comments");
    assert_eq!(std::fs::read_dir(dir).unwrap().count(), 1);
    assert!(hermes.pending_files("comments").is_empty());
}

#[test]
fn test_pending_lists_entries() {
    let hermes = HermesTest::new();
    hermes.seed_cache(&sample_issues());

    hermes.run_success(&["mutate", "42", "--title", "Dark mode"]);
    hermes.run_success(&["mutate", "7", "--state", "closed"]);
    hermes.run_success(&["comment", "7", "closing"]);
    hermes.run_success(&["labels", "10", "ux"]);

    let output = hermes.run_json(&["pending"]);
    assert_eq!(output["total"], 4);
    let update_keys: Vec<&str> = output["field_updates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["key"].as_str().unwrap())
        .collect();
    assert_eq!(update_keys, vec!["7", "42"]);

    let text = hermes.run_success(&["pending"]);
    assert!(text.contains("4 pending"));
}

#[test]
fn test_pending_when_empty() {
    let hermes = HermesTest::new();
    let text = hermes.run_success(&["pending"]);
    assert!(text.contains("No pending mutations"));
}
