//! Common test utilities for CLI testing.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use httpreq_test_utils::{temp_dir, write_file};
use tempfile::TempDir;

/// Test context with a temporary working directory.
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: temp_dir(),
        }
    }

    /// Write `.httpreq/config.yaml` in the working directory.
    pub fn with_config(self, config: &str) -> Self {
        write_file(self.path(), ".httpreq/config.yaml", config);
        self
    }

    /// Write a `.env` file in the working directory.
    pub fn with_dotenv(self, contents: &str) -> Self {
        write_file(self.path(), ".env", contents);
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join(".httpreq").join("config.yaml")
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A command running in this context with a clean `HTTPREQ_*` environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("httpreq").expect("Binary not found");
        cmd.current_dir(self.path()).env("NO_COLOR", "1");
        for (key, _) in std::env::vars() {
            if key.starts_with("HTTPREQ_") || key == "RUST_LOG" {
                cmd.env_remove(key);
            }
        }
        cmd
    }
}
