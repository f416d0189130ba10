#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway data directory with helpers to drive the binary against it
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.data_dir().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_blob(&self, key: &str) -> Option<Value> {
        let path = self.data_dir().join(format!("{key}.json"));
        let contents = fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Command with `--data-dir` pointing at this directory
    pub fn cmd(&self) -> Command {
        let mut cmd = tapestry_cmd();
        cmd.arg("--data-dir").arg(self.data_dir());
        cmd
    }

    /// Run with `--json`, assert success and return the envelope's `data`
    pub fn json_ok(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run tapestry");
        assert!(
            output.status.success(),
            "tapestry {args:?} failed: {}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        assert_eq!(envelope["status"], "success");
        envelope["data"].clone()
    }

    /// Run with `--json`, assert the exit code and return the error envelope
    pub fn json_err(&self, args: &[&str], code: i32) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run tapestry");
        assert_eq!(output.status.code(), Some(code), "tapestry {args:?}");
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        assert_eq!(envelope["status"], "error");
        envelope
    }

    /// Add a task and return its id
    pub fn add_task(&self, period: &str, title: &str) -> String {
        let data = self.json_ok(&["task", "add", period, title]);
        data["task"]["id"].as_str().expect("task id").to_string()
    }
}

pub fn tapestry_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tapestry").expect("binary");
    cmd.env_remove("TAPESTRY_DIR").env_remove("RUST_LOG");
    cmd
}
