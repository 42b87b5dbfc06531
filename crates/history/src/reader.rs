//! Revision reader
//!
//! Walks a store from its root towards the past. The entry stored under an
//! id holds the text that save replaced, so reconstructing an id yields the
//! document as it stood at the ledger entry before it.

use folio_core::{Codec, RevisionEntry, RevisionId, RevisionStore, VersionError};
use std::path::Path;

/// Rebuilds historical texts from a revision store
pub struct RevisionReader<'a> {
    codec: &'a dyn Codec,
}

impl<'a> RevisionReader<'a> {
    pub fn new(codec: &'a dyn Codec) -> Self {
        Self { codec }
    }

    /// Text recorded under `target` for `doc`
    ///
    /// `Ok(None)` when the id is not in the chain or a patch on the way
    /// does not apply. Reads never modify the store.
    pub fn reconstruct(
        &self,
        doc: &Path,
        target: RevisionId,
    ) -> Result<Option<String>, VersionError> {
        let store = RevisionStore::load(doc)?;
        self.reconstruct_in(&store, target)
    }

    /// Same as [`reconstruct`](Self::reconstruct) over an already loaded store
    pub fn reconstruct_in(
        &self,
        store: &RevisionStore,
        target: RevisionId,
    ) -> Result<Option<String>, VersionError> {
        if store.is_empty() {
            return Ok(None);
        }
        let root = store
            .root()
            .ok_or_else(|| VersionError::consistency(target, "store has entries but no root"))?;

        let mut text = root.to_string();
        let mut pending: Vec<(RevisionId, &str)> = Vec::new();
        let mut found = false;

        for (id, entry) in store.entries().rev() {
            match entry {
                RevisionEntry::Delta(patch) => pending.push((id, patch.as_str())),
                RevisionEntry::Rewrite(snapshot) => {
                    text = snapshot.clone();
                    pending.clear();
                }
            }
            if id == target {
                found = true;
                break;
            }
        }

        if !found {
            tracing::debug!(id = %target, "revision not in chain");
            return Ok(None);
        }

        for (id, patch) in pending {
            match self.codec.patch(&text, patch) {
                Some(next) => text = next,
                None => {
                    tracing::warn!(
                        id = %id,
                        store = %store.path().display(),
                        "delta does not apply, revision unavailable"
                    );
                    return Ok(None);
                }
            }
        }

        Ok(Some(text))
    }
}
