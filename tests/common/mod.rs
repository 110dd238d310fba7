#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Helper struct to run hermes commands in an isolated temp directory
pub struct HermesTest {
    pub temp_dir: TempDir,
    binary_path: String,
}

impl HermesTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        HermesTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_hermes").to_string(),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Output {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("HERMES_ROOT")
            .env_remove("HERMES_TOKEN")
            .env_remove("GITHUB_TOKEN")
            .env_remove("HERMES_LOG")
            .env("NO_COLOR", "1");
        for (key, value) in envs {
            command.env(key, value);
        }
        command.output().expect("Failed to execute hermes command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut full: Vec<&str> = args.to_vec();
        full.push("--json");
        let stdout = self.run_success(&full);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join(".hermes")
    }

    /// Seed the cache through `hermes cache import`.
    pub fn seed_cache(&self, issues: &Value) {
        let path = self.temp_dir.path().join("seed.json");
        fs::write(&path, serde_json::to_string(issues).unwrap()).expect("Failed to write seed");
        self.run_success(&["cache", "import", "seed.json"]);
    }

    pub fn write_config(&self, content: &str) {
        fs::create_dir_all(self.root()).expect("Failed to create .hermes directory");
        fs::write(self.root().join("config.yaml"), content).expect("Failed to write config");
    }

    pub fn read_cached_issue(&self, id: u64) -> Value {
        let path = self
            .root()
            .join("cache")
            .join("issues")
            .join(format!("{id}.json"));
        let content = fs::read_to_string(path).expect("Failed to read cached issue");
        serde_json::from_str(&content).expect("Failed to parse cached issue")
    }

    /// Sorted file names in one pending queue directory (`updates`, `comments`, `labels`).
    pub fn pending_files(&self, queue: &str) -> Vec<String> {
        let dir = self.root().join("pending").join(queue);
        let mut names: Vec<String> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub fn read_pending(&self, queue: &str, name: &str) -> Value {
        let path = self.root().join("pending").join(queue).join(name);
        let content = fs::read_to_string(path).expect("Failed to read pending entry");
        serde_json::from_str(&content).expect("Failed to parse pending entry")
    }
}

pub fn sample_issues() -> Value {
    serde_json::json!([
        {
            "id": 7,
            "title": "Crash on login",
            "body": "stack trace",
            "state": "open",
            "labels": ["bug", "p1"]
        },
        { "id": 42, "title": "Add dark mode", "state": "open", "labels": ["feature"] },
        { "id": 108, "title": "Docs typo", "state": "closed", "labels": ["docs"] },
        { "id": 10, "title": "Improve login flow", "state": "open", "labels": ["bugfix", "ux"] }
    ])
}
