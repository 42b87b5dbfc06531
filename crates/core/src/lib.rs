//! Folio Core - storage primitives for document revision history
//!
//! This crate provides the foundational layer:
//! - Revision ids (ledger timestamps)
//! - Line diff/patch codecs
//! - The per-document revision store and its on-disk format
//! - Per-document locking and atomic writes

pub mod codec;
pub mod error;
pub mod id;
pub mod lock;
pub mod store;

// Re-export main types for convenience
pub use codec::{BuiltinCodec, Codec, CodecKind, ExternalCodec};
pub use error::{ErrorClass, VersionError};
pub use id::RevisionId;
pub use lock::DocumentLock;
pub use store::{EntryKind, RevisionEntry, RevisionStore, StoreSource};

/// Common result type used throughout folio-core
pub type Result<T> = std::result::Result<T, VersionError>;
