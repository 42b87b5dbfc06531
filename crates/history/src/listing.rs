//! Revision list view
//!
//! Rows start with the live document. Each row is described by the ledger
//! entry *after* it in newest-first order, because the chain entry under an
//! id holds the text that save replaced. The last row is the document as it
//! was created.

use crate::endpoints::Selector;
use folio_core::{RevisionId, RevisionStore, VersionError};
use folio_ledger::{Ledger, LedgerEntry};
use std::path::Path;

/// Row label for the live document
pub const CURRENT_LABEL: &str = "Current";
/// Row label for the oldest reachable revision
pub const CREATED_LABEL: &str = "Created";

/// A navigable row of the revision list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionLink {
    /// Text the row opens
    pub target: Selector,
    /// `Current`, `Created`, or none for plain revisions
    pub label: Option<&'static str>,
    /// Date shown for the row ([`RevisionId::ORIGIN`] when unknown)
    pub timestamp: RevisionId,
    /// Ledger entry describing who produced this text
    pub entry: Option<LedgerEntry>,
}

impl RevisionLink {
    fn new(target: Selector, label: Option<&'static str>) -> Self {
        Self {
            target,
            label,
            timestamp: RevisionId::ORIGIN,
            entry: None,
        }
    }
}

/// Build the revision list of `doc`
///
/// A ledger entry becomes a row when its chain entry is a rewrite, or a
/// delta whose newer neighbours are all present. A ledger entry without a
/// chain entry breaks the delta chain for everything older.
pub fn list_revisions(
    doc: &Path,
    ledger: &Ledger,
    store: &RevisionStore,
) -> Result<Vec<RevisionLink>, VersionError> {
    if store.is_empty() || ledger.is_empty() {
        return Err(VersionError::NoHistory {
            doc: doc.to_path_buf(),
        });
    }

    let mut rows = vec![RevisionLink::new(Selector::Current, Some(CURRENT_LABEL))];
    let mut awaiting: Option<usize> = Some(0);
    let mut linked = true;

    for entry in ledger.entries() {
        let id = entry.timestamp;
        if let Some(i) = awaiting.take() {
            rows[i].timestamp = id;
            rows[i].entry = Some(entry.clone());
        }

        match store.get(id) {
            Some(chain) => {
                if chain.is_rewrite() || (linked && chain.is_delta()) {
                    awaiting = Some(rows.len());
                    rows.push(RevisionLink::new(Selector::Revision(id), None));
                    linked = true;
                }
            }
            None => linked = false,
        }
    }

    if let Some(i) = awaiting {
        let row = &mut rows[i];
        if row.label.is_none() {
            row.label = Some(CREATED_LABEL);
        }
        let created = ledger.created();
        row.timestamp = created.map(|c| c.timestamp).unwrap_or(RevisionId::ORIGIN);
        row.entry = created.cloned();
    }

    Ok(rows)
}
