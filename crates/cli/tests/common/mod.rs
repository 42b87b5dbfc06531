//! Common utilities for integration tests

pub mod cli;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch site with its own config file
pub struct TestSite {
    dir: TempDir,
    config: PathBuf,
}

impl TestSite {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = dir.path().join("folio-config.toml");
        Self { dir, config }
    }

    /// Write the config file used by every command of this site
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(&self.config, toml).expect("Failed to write config");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn doc(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.doc(name)).expect("Failed to read document")
    }

    /// Command builder bound to this site's directory and config
    pub fn folio(&self, args: &[&str]) -> cli::FolioCommand {
        let mut cmd = cli::FolioCommand::new(self.dir.path());
        cmd.args(args)
            .env("FOLIO_CONFIG", &self.config.to_string_lossy())
            .env("RUST_LOG", "warn");
        cmd
    }

    /// `folio save <name> --at <at> --user <user>` with `text` on stdin
    pub fn save(&self, name: &str, text: &str, at: u64, user: &str) -> cli::CommandResult {
        let at = at.to_string();
        self.folio(&["save", name, "--at", &at, "--user", user])
            .stdin(text)
            .assert_success()
            .expect("save failed")
    }
}
