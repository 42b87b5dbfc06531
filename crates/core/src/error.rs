//! Error taxonomy for the revision engine

use crate::id::RevisionId;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Broad class of a [`VersionError`], used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Store or ledger file unreadable/unwritable
    Storage,
    /// Corrupted or tampered revision chain
    Consistency,
    /// Expected negative result
    NotFound,
    /// Caller asked for history on a document kind that has none
    Unsupported,
}

/// Errors raised by the revision store, ledger, writer and reader
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VersionError {
    /// I/O failure on a store, ledger or lock file
    #[error("storage error on {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A store or ledger file exists but cannot be decoded
    #[error("malformed file {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// The chain cannot be walked (bad patch, unknown entry kind, missing root)
    #[error("revision chain broken at {id}: {reason}")]
    Consistency { id: RevisionId, reason: String },

    /// The requested revision is not in the chain
    #[error("{}: revision {id} not found", doc.display())]
    NotFound { doc: PathBuf, id: RevisionId },

    /// The document has no recorded history
    #[error("{}: no versions found", doc.display())]
    NoHistory { doc: PathBuf },

    /// Versioning requested for a document type with no handler
    #[error("{}: not of a supported type", doc.display())]
    Unsupported { doc: PathBuf },
}

impl VersionError {
    pub fn storage(path: &Path, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn format(path: &Path, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn consistency(id: RevisionId, reason: impl Into<String>) -> Self {
        Self::Consistency {
            id,
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Storage { .. } | Self::Format { .. } => ErrorClass::Storage,
            Self::Consistency { .. } => ErrorClass::Consistency,
            Self::NotFound { .. } | Self::NoHistory { .. } => ErrorClass::NotFound,
            Self::Unsupported { .. } => ErrorClass::Unsupported,
        }
    }

    /// True for results callers should treat as a normal negative answer
    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }
}
