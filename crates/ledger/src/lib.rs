//! Document change-log ledger
//!
//! This crate provides:
//! - Change-log entries (timestamp, actor, notes)
//! - The per-document ledger file with same-day merging
//! - The revision-id view used by the history writer

pub mod entry;
pub mod ledger;

// Re-exports
pub use entry::{Actor, LedgerEntry};
pub use ledger::{ledger_path, Ledger, RecordOutcome, RevisionIds, PROPS_PREFIX};

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, folio_core::VersionError>;
