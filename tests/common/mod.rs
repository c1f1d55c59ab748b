//! Common test utilities for sbx integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! machine's real settings locations or key ring.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use sealbox::models::RsaKeyRecord;
pub use tempfile::TempDir;

/// A test environment with one isolated directory per settings location.
///
/// The `sbx()` method returns a `Command` that sets the `SBX_*_DIR`
/// variables per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub portable_dir: TempDir,
    pub global_dir: TempDir,
    pub local_dir: TempDir,
    pub work_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            portable_dir: TempDir::new().unwrap(),
            global_dir: TempDir::new().unwrap(),
            local_dir: TempDir::new().unwrap(),
            work_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the sbx binary with isolated locations.
    pub fn sbx(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sbx"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("SBX_PORTABLE_DIR", self.portable_dir.path());
        cmd.env("SBX_GLOBAL_DIR", self.global_dir.path());
        cmd.env("SBX_LOCAL_DIR", self.local_dir.path());
        cmd
    }

    /// The key-storage directory beside the local settings file.
    pub fn local_keys_dir(&self) -> PathBuf {
        self.local_dir.path().join("Keys")
    }

    /// The key-storage directory beside the portable settings file.
    pub fn portable_keys_dir(&self) -> PathBuf {
        self.portable_dir.path().join("Keys")
    }

    /// Write raw JSON as the settings document in the given directory.
    pub fn write_settings(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("settings.json");
        fs::write(&path, json).expect("Failed to write settings file");
        path
    }

    /// Write a valid public key record file under the work directory.
    pub fn write_key_file(&self, file_name: &str, label: &str, seed: u8) -> PathBuf {
        let key = sample_key(label, seed);
        let path = self.work_dir.path().join(file_name);
        fs::write(&path, serde_json::to_string_pretty(&key).unwrap())
            .expect("Failed to write key record file");
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A deterministic 1024-bit public key record.
pub fn sample_key(label: &str, seed: u8) -> RsaKeyRecord {
    RsaKeyRecord::new_public(label, &[seed; 128], &[0x01, 0x00, 0x01])
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout was not valid JSON")
}
