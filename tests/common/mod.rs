//! Common test utilities for stackforge integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

mod manifest_builder;

pub use manifest_builder::{ClassEntry, ManifestBuilder};

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory holding a `stackforge.toml`.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join("stackforge.toml")
    }

    /// Default output directory of `stackforge synth`
    pub fn templates_path(&self) -> PathBuf {
        self.project_dir.join("build").join("templates")
    }

    pub fn write_manifest(&self, content: &str) -> Result<()> {
        fs::write(self.manifest_path(), content)?;
        Ok(())
    }

    pub fn read_template(&self, file_name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.templates_path().join(file_name))?)
    }

    /// The `stackforge` binary, run inside the project directory without colors.
    pub fn stackforge(&self) -> Command {
        let mut cmd = Command::cargo_bin("stackforge").expect("stackforge binary is built");
        cmd.current_dir(&self.project_dir).env("NO_COLOR", "1").env_remove("STACKFORGE_ENV").env_remove("RUST_LOG");
        cmd
    }
}
