//! Folio History - revision writer, reader and host hooks
//!
//! This crate provides:
//! - The writer that records a revision on every save
//! - The reader that rebuilds any stored revision
//! - Raw/compare endpoints and the revision list view
//! - The plugin registry the host dispatches save/render events through

pub mod config;
pub mod endpoints;
pub mod hooks;
pub mod listing;
pub mod reader;
pub mod writer;

// Re-exports
pub use config::HistoryConfig;
pub use endpoints::{Comparison, History, Resolved, Selector};
pub use hooks::{Handled, Plugin, Registry, RegistryBuilder, RenderEvent, SaveEvent, VersionsPlugin};
pub use listing::{list_revisions, RevisionLink};
pub use reader::RevisionReader;
pub use writer::{CommitOutcome, RevisionWriter, SkipReason};

/// Result type for history operations
pub type Result<T> = std::result::Result<T, folio_core::VersionError>;
