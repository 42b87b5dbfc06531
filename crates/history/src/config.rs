//! Engine configuration (`[history]` section)

use folio_core::{Codec, CodecKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Document types that get history when no list is configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "md", "markdown", "mkd", "mdwn", "mdown", "mdtxt", "mdtext", "html", "htm", "txt",
];

/// Revision history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Record revisions on save
    pub enabled: bool,

    /// Fail the save when history cannot be recorded
    pub strict: bool,

    /// File extensions (lowercase, no dot) that are versioned
    pub extensions: Vec<String>,

    /// Diff/patch implementation
    pub codec: CodecKind,

    /// Parent directory for external codec scratch files (system temp dir if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            codec: CodecKind::Builtin,
            scratch_dir: None,
        }
    }
}

impl HistoryConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        for ext in &self.extensions {
            if ext.is_empty() {
                return Err("history.extensions must not contain empty entries".into());
            }
            if ext.starts_with('.') || ext.contains('/') {
                return Err(format!(
                    "history.extensions entry '{}' must be a bare extension such as 'md'",
                    ext
                ));
            }
        }

        if let Some(dir) = &self.scratch_dir {
            if !dir.is_dir() {
                return Err(format!(
                    "history.scratch_dir {} is not a directory",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Whether `doc` has a versioned extension (case-insensitive)
    pub fn is_versioned(&self, doc: &Path) -> bool {
        let Some(ext) = doc.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
    }

    /// Instantiate the configured codec
    pub fn build_codec(&self) -> Box<dyn Codec> {
        self.codec.build(self.scratch_dir.as_deref())
    }
}
