//! Revision writer
//!
//! Runs after a document has been persisted. The ledger decides the id of
//! the new revision and of the one before it; every chain entry newer than
//! the previous id belongs to saves the ledger has since merged, so those
//! entries are folded back into the text they replaced before the new
//! entry is computed against it.

use crate::config::HistoryConfig;
use folio_core::{
    Codec, DocumentLock, EntryKind, RevisionEntry, RevisionId, RevisionStore, VersionError,
};
use folio_ledger::Ledger;
use std::path::Path;

/// Why a commit did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `history.enabled` is off
    Disabled,
    /// The document type is not versioned
    Unsupported,
    /// The document did not exist before this save
    NoPrevious,
    /// The ledger has no change-log entry to attach the revision to
    EmptyLedger,
}

/// Result of [`RevisionWriter::commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Skipped(SkipReason),
    Recorded {
        /// Id the new entry was stored under
        id: RevisionId,
        /// Whether a delta or a full snapshot was stored
        kind: EntryKind,
        /// Number of superseded entries folded away
        folded: usize,
    },
}

impl CommitOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, CommitOutcome::Recorded { .. })
    }
}

/// Appends revisions to a document's store
pub struct RevisionWriter<'a> {
    config: &'a HistoryConfig,
    codec: &'a dyn Codec,
}

impl<'a> RevisionWriter<'a> {
    pub fn new(config: &'a HistoryConfig, codec: &'a dyn Codec) -> Self {
        Self { config, codec }
    }

    /// Record the save that turned `previous` into `new_text`
    ///
    /// `ledger` must already contain the entry for this save. The store is
    /// locked from load to save and left untouched on any error.
    pub fn commit(
        &self,
        doc: &Path,
        previous: Option<&str>,
        new_text: &str,
        ledger: &Ledger,
    ) -> Result<CommitOutcome, VersionError> {
        if !self.config.enabled {
            return Ok(CommitOutcome::Skipped(SkipReason::Disabled));
        }
        if !self.config.is_versioned(doc) {
            return Ok(CommitOutcome::Skipped(SkipReason::Unsupported));
        }
        let Some(previous) = previous else {
            return Ok(CommitOutcome::Skipped(SkipReason::NoPrevious));
        };
        let Some(ids) = ledger.revision_ids() else {
            return Ok(CommitOutcome::Skipped(SkipReason::EmptyLedger));
        };

        let _lock = DocumentLock::acquire(doc)?;
        let mut store = RevisionStore::load(doc)?;

        let (ctx, folded) = self.consolidate(&mut store, ids.previous, previous)?;

        let entry = match self.codec.diff(new_text, &ctx) {
            Some(patch) if !prefers_rewrite(&patch, &ctx) => RevisionEntry::Delta(patch),
            _ => RevisionEntry::Rewrite(ctx),
        };
        let kind = entry.kind();

        store.insert(ids.current, entry);
        store.set_root(new_text.to_string());
        store.save()?;

        tracing::info!(
            doc = %doc.display(),
            id = %ids.current,
            kind = %kind,
            folded,
            "revision recorded"
        );

        Ok(CommitOutcome::Recorded {
            id: ids.current,
            kind,
            folded,
        })
    }

    /// Remove every entry newer than `previous_id` and return the text as of
    /// `previous_id` together with the number of entries removed
    ///
    /// Only the oldest candidate rewrite matters: deltas newer than it are
    /// dropped, the rewrite resets the context and older deltas roll it back.
    fn consolidate(
        &self,
        store: &mut RevisionStore,
        previous_id: RevisionId,
        previous_text: &str,
    ) -> Result<(String, usize), VersionError> {
        let candidates: Vec<(RevisionId, RevisionEntry)> = store
            .newer_than(previous_id)
            .into_iter()
            .map(|(id, entry)| (id, entry.clone()))
            .collect();

        let oldest_rewrite = candidates
            .iter()
            .filter(|(_, entry)| entry.is_rewrite())
            .map(|(id, _)| *id)
            .min();

        let mut ctx = match store.root() {
            Some(root) if !root.is_empty() => root.to_string(),
            _ => previous_text.to_string(),
        };

        for (id, entry) in &candidates {
            store.remove(*id);

            if matches!(oldest_rewrite, Some(rw) if *id > rw) {
                tracing::debug!(id = %id, "superseded entry dropped");
                continue;
            }

            match entry {
                RevisionEntry::Rewrite(text) => {
                    tracing::debug!(id = %id, "context reset from rewrite");
                    ctx = text.clone();
                }
                RevisionEntry::Delta(patch) => {
                    tracing::debug!(id = %id, "delta folded");
                    ctx = self
                        .codec
                        .patch(&ctx, patch)
                        .ok_or_else(|| VersionError::consistency(*id, "unable to patch"))?;
                }
            }
        }

        Ok((ctx, candidates.len()))
    }
}

/// A patch over two thirds the size of the text it reconstructs is not
/// worth storing as a delta
fn prefers_rewrite(patch: &str, ctx: &str) -> bool {
    patch.len() * 3 > ctx.len() * 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::BuiltinCodec;
    use folio_ledger::{Actor, LedgerEntry};
    use tempfile::TempDir;

    const T0: u64 = 1_700_000_000;

    fn ledger_with(doc: &Path, ids: &[u64]) -> Ledger {
        let mut ledger = Ledger::empty(doc);
        for (i, secs) in ids.iter().enumerate() {
            let actor = Actor::new("127.0.0.1", format!("user{}", i));
            ledger.record(LedgerEntry::new(RevisionId::from_secs(*secs), actor));
        }
        ledger
    }

    #[test]
    fn test_prefers_rewrite_threshold() {
        assert!(!prefers_rewrite("abcd", "abcdef"));
        assert!(prefers_rewrite("abcde", "abcdef"));
        assert!(!prefers_rewrite("", ""));
    }

    #[test]
    fn test_skip_reasons() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("page.md");
        let ledger = ledger_with(&doc, &[T0]);
        let codec = BuiltinCodec;

        let disabled = HistoryConfig {
            enabled: false,
            ..Default::default()
        };
        let writer = RevisionWriter::new(&disabled, &codec);
        assert_eq!(
            writer.commit(&doc, Some("a"), "b", &ledger).unwrap(),
            CommitOutcome::Skipped(SkipReason::Disabled)
        );

        let config = HistoryConfig::default();
        let writer = RevisionWriter::new(&config, &codec);
        assert_eq!(
            writer
                .commit(&dir.path().join("pic.png"), Some("a"), "b", &ledger)
                .unwrap(),
            CommitOutcome::Skipped(SkipReason::Unsupported)
        );
        assert_eq!(
            writer.commit(&doc, None, "b", &ledger).unwrap(),
            CommitOutcome::Skipped(SkipReason::NoPrevious)
        );
        assert_eq!(
            writer
                .commit(&doc, Some("a"), "b", &Ledger::empty(&doc))
                .unwrap(),
            CommitOutcome::Skipped(SkipReason::EmptyLedger)
        );
        assert!(!folio_core::store::store_path(&doc).exists());
    }

    #[test]
    fn test_first_revision_is_delta_against_previous_text() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("page.md");
        let ledger = ledger_with(&doc, &[T0]);
        let config = HistoryConfig::default();
        let codec = BuiltinCodec;

        let previous: String = (0..40).map(|i| format!("line number {}\n", i)).collect();
        let new_text = previous.replace("line number 20\n", "line twenty\n");
        let outcome = RevisionWriter::new(&config, &codec)
            .commit(&doc, Some(&previous), &new_text, &ledger)
            .unwrap();

        assert_eq!(
            outcome,
            CommitOutcome::Recorded {
                id: RevisionId::from_secs(T0),
                kind: EntryKind::Delta,
                folded: 0,
            }
        );
        let store = RevisionStore::load(&doc).unwrap();
        assert_eq!(store.root(), Some(new_text.as_str()));
        let patch = store.get(RevisionId::from_secs(T0)).unwrap().payload();
        assert_eq!(codec.patch(&new_text, patch), Some(previous));
    }

    #[test]
    fn test_large_change_is_rewrite() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("page.md");
        let ledger = ledger_with(&doc, &[T0]);
        let config = HistoryConfig::default();
        let codec = BuiltinCodec;

        let outcome = RevisionWriter::new(&config, &codec)
            .commit(&doc, Some("short\n"), "entirely different text\n", &ledger)
            .unwrap();

        assert!(matches!(
            outcome,
            CommitOutcome::Recorded {
                kind: EntryKind::Rewrite,
                ..
            }
        ));
        let store = RevisionStore::load(&doc).unwrap();
        assert_eq!(
            store.get(RevisionId::from_secs(T0)),
            Some(&RevisionEntry::Rewrite("short\n".into()))
        );
    }

    #[test]
    fn test_consolidation_failure_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("page.md");
        let path = folio_core::store::store_path(&doc);
        std::fs::write(
            &path,
            r#"{"root":"current\n","1700000100":["delta","@@ -1 +1 @@\n-nope\n+x\n"]}"#,
        )
        .unwrap();
        let before = std::fs::read(&path).unwrap();

        // Ledger now holds one merged entry newer than nothing
        let ledger = ledger_with(&doc, &[T0 + 200]);
        let config = HistoryConfig::default();
        let codec = BuiltinCodec;
        let err = RevisionWriter::new(&config, &codec)
            .commit(&doc, Some("current\n"), "next\n", &ledger)
            .unwrap_err();

        assert_eq!(err.class(), folio_core::ErrorClass::Consistency);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }
}
