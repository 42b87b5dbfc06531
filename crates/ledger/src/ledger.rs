//! Per-document change-log ledger (`.props;<name>`)

use crate::entry::LedgerEntry;
use folio_core::store::{atomic_write, sibling_path};
use folio_core::{RevisionId, VersionError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Prefix of the ledger file
pub const PROPS_PREFIX: &str = ".props;";

/// On-disk shape; unknown keys are carried through untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PropsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<LedgerEntry>,
    #[serde(rename = "change-log", default, skip_serializing_if = "Vec::is_empty")]
    change_log: Vec<LedgerEntry>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// What [`Ledger::record_save`] did with an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First save of a new document: only `created` was set
    Created,
    /// A new change-log entry was pushed
    Appended,
    /// Folded into the newest entry (same actor, same day)
    Merged,
}

/// The revision ids a commit works with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionIds {
    /// Id of the save being recorded (newest change-log entry)
    pub current: RevisionId,
    /// Id of the entry before it, [`RevisionId::ORIGIN`] if none
    pub previous: RevisionId,
}

/// Ordered change log of a document, newest entry first
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    props: PropsFile,
}

impl Ledger {
    /// Open the ledger of `doc`; a missing file gives an empty ledger
    pub fn open(doc: &Path) -> Result<Self, VersionError> {
        let path = ledger_path(doc);
        let props = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| VersionError::format(&path, e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PropsFile::default(),
            Err(e) => return Err(VersionError::storage(&path, e)),
        };
        Ok(Self { path, props })
    }

    /// Empty in-memory ledger for `doc`
    pub fn empty(doc: &Path) -> Self {
        Self {
            path: ledger_path(doc),
            props: PropsFile::default(),
        }
    }

    /// Atomically write the ledger file
    pub fn save(&self) -> Result<(), VersionError> {
        let bytes = serde_json::to_vec_pretty(&self.props)
            .map_err(|e| VersionError::format(&self.path, e.to_string()))?;
        atomic_write(&self.path, &bytes).map_err(|e| VersionError::storage(&self.path, e))
    }

    /// Record a save. `had_previous` is false for the first save of a new
    /// document, which only stamps `created`.
    pub fn record_save(&mut self, had_previous: bool, entry: LedgerEntry) -> RecordOutcome {
        if !had_previous {
            if self.props.created.is_none() {
                self.props.created = Some(entry);
            }
            return RecordOutcome::Created;
        }
        self.record(entry)
    }

    /// Add a change-log entry, merging it into the newest one when the same
    /// actor already saved on the same calendar day
    pub fn record(&mut self, mut entry: LedgerEntry) -> RecordOutcome {
        if let Some(latest) = self.props.change_log.first_mut() {
            if latest.merges_with(&entry) {
                latest.timestamp = latest.timestamp.max(entry.timestamp);
                latest.notes.append(&mut entry.notes);
                tracing::debug!(id = %latest.timestamp, "ledger entry merged");
                return RecordOutcome::Merged;
            }
            // Keep ids strictly increasing even with clock skew
            if entry.timestamp <= latest.timestamp {
                match latest.timestamp.checked_next() {
                    Some(next) => entry.timestamp = next,
                    None => {
                        tracing::warn!(
                            id = %latest.timestamp,
                            "latest ledger id has no successor, folding entry into it"
                        );
                        latest.notes.append(&mut entry.notes);
                        return RecordOutcome::Merged;
                    }
                }
            }
        }
        tracing::debug!(id = %entry.timestamp, "ledger entry appended");
        self.props.change_log.insert(0, entry);
        RecordOutcome::Appended
    }

    /// `(current, previous)` ids, `None` without change-log entries
    pub fn revision_ids(&self) -> Option<RevisionIds> {
        let current = self.props.change_log.first()?.timestamp;
        let previous = self
            .props
            .change_log
            .get(1)
            .map(|e| e.timestamp)
            .unwrap_or(RevisionId::ORIGIN);
        Some(RevisionIds { current, previous })
    }

    /// Change-log entries, newest first
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.props.change_log
    }

    /// Get the newest entry
    pub fn latest(&self) -> Option<&LedgerEntry> {
        self.props.change_log.first()
    }

    /// Get an entry by revision id
    pub fn get(&self, id: RevisionId) -> Option<&LedgerEntry> {
        self.props.change_log.iter().find(|e| e.timestamp == id)
    }

    pub fn created(&self) -> Option<&LedgerEntry> {
        self.props.created.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.props.change_log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.change_log.is_empty()
    }
}

/// Path of the ledger file for `doc`
pub fn ledger_path(doc: &Path) -> PathBuf {
    sibling_path(doc, PROPS_PREFIX)
}
