//! Common test utilities for ResumeGuide integration tests

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// A scratch working directory plus a scrubbed environment, so each
/// test process sees only the credentials the test itself writes.
pub struct TestEnv {
    pub temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// A command running in the scratch dir with Google env vars removed.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_resumeguide"));
        cmd.current_dir(self.temp_dir.path())
            .env_remove("GOOGLE_APPLICATION_CREDENTIALS")
            .env_remove("GOOGLE_GENAI_USE_VERTEXAI")
            .env_remove("GOOGLE_CLOUD_PROJECT")
            .env_remove("GOOGLE_CLOUD_LOCATION")
            .env_remove("GOOGLE_OAUTH_ACCESS_TOKEN")
            .env_remove("GOOGLE_API_KEY")
            .env_remove("GEMINI_API_KEY");
        cmd
    }

    /// Drop a plausible service account key into the scratch dir.
    pub fn create_credentials(&self) {
        let path = self.temp_dir.path().join("sa.json");
        fs::write(
            &path,
            r#"{"type": "service_account", "project_id": "resume-demo", "private_key_id": "0000"}"#,
        )
        .expect("failed to write credentials");
    }

    /// A JSON file that is not a service account key.
    pub fn create_unrelated_json(&self) {
        let path = self.temp_dir.path().join("notes.json");
        fs::write(&path, r#"{"kind": "notes"}"#).expect("failed to write notes");
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
