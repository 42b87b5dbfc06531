//! Read endpoints: raw revision text and revision comparison

use crate::config::HistoryConfig;
use crate::listing::{list_revisions, RevisionLink};
use crate::reader::RevisionReader;
use crate::writer::{CommitOutcome, RevisionWriter};
use folio_core::{Codec, RevisionId, RevisionStore, VersionError};
use folio_ledger::Ledger;
use std::path::Path;
use std::str::FromStr;

/// A revision named by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// The live document
    Current,
    /// A stored revision
    Revision(RevisionId),
}

impl Selector {
    /// Human label: `Current` or the revision's date
    pub fn label(&self) -> String {
        match self {
            Selector::Current => "Current".to_string(),
            Selector::Revision(id) => id.format_date(),
        }
    }
}

impl FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "~" | "current" => Ok(Selector::Current),
            other => other
                .parse()
                .map(Selector::Revision)
                .map_err(|_| format!("'{}' is neither '~' nor a revision id", other)),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Current => f.write_str("~"),
            Selector::Revision(id) => write!(f, "{}", id),
        }
    }
}

/// One side of a comparison
#[derive(Debug, Clone)]
pub struct Resolved {
    pub selector: Selector,
    pub text: String,
}

/// Two resolved revisions and the patch between them
#[derive(Debug, Clone)]
pub struct Comparison {
    pub a: Resolved,
    pub b: Resolved,
    /// Unified diff from `a` to `b`; empty when identical, `None` when the
    /// texts cannot be diffed
    pub patch: Option<String>,
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        self.a.text == self.b.text
    }
}

/// Entry point tying configuration, codec, writer and reader together
pub struct History {
    config: HistoryConfig,
    codec: Box<dyn Codec>,
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        let codec = config.build_codec();
        Self { config, codec }
    }

    pub fn with_codec(config: HistoryConfig, codec: Box<dyn Codec>) -> Self {
        Self { config, codec }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    pub fn writer(&self) -> RevisionWriter<'_> {
        RevisionWriter::new(&self.config, self.codec.as_ref())
    }

    pub fn reader(&self) -> RevisionReader<'_> {
        RevisionReader::new(self.codec.as_ref())
    }

    /// See [`RevisionWriter::commit`]
    pub fn commit(
        &self,
        doc: &Path,
        previous: Option<&str>,
        new_text: &str,
        ledger: &Ledger,
    ) -> Result<CommitOutcome, VersionError> {
        self.writer().commit(doc, previous, new_text, ledger)
    }

    /// See [`RevisionReader::reconstruct`]
    pub fn reconstruct(
        &self,
        doc: &Path,
        id: RevisionId,
    ) -> Result<Option<String>, VersionError> {
        self.reader().reconstruct(doc, id)
    }

    /// Text of revision `id`, as served by the raw endpoint
    pub fn raw(&self, doc: &Path, id: RevisionId) -> Result<String, VersionError> {
        self.ensure_versioned(doc)?;
        let ledger = Ledger::open(doc)?;
        if ledger.is_empty() {
            return Err(VersionError::NoHistory {
                doc: doc.to_path_buf(),
            });
        }
        self.reconstruct(doc, id)?.ok_or_else(|| VersionError::NotFound {
            doc: doc.to_path_buf(),
            id,
        })
    }

    /// Resolve both selectors and diff them
    pub fn compare(&self, doc: &Path, a: Selector, b: Selector) -> Result<Comparison, VersionError> {
        self.ensure_versioned(doc)?;
        let a = self.resolve(doc, a)?;
        let b = self.resolve(doc, b)?;

        let patch = if a.text == b.text {
            Some(String::new())
        } else {
            self.codec.diff(&a.text, &b.text)
        };
        Ok(Comparison { a, b, patch })
    }

    /// Rows of the revision list for `doc`
    pub fn versions(&self, doc: &Path) -> Result<Vec<RevisionLink>, VersionError> {
        self.ensure_versioned(doc)?;
        let ledger = Ledger::open(doc)?;
        let store = RevisionStore::load(doc)?;
        list_revisions(doc, &ledger, &store)
    }

    fn resolve(&self, doc: &Path, selector: Selector) -> Result<Resolved, VersionError> {
        let text = match selector {
            Selector::Current => {
                std::fs::read_to_string(doc).map_err(|e| VersionError::storage(doc, e))?
            }
            Selector::Revision(id) => {
                self.reconstruct(doc, id)?
                    .ok_or_else(|| VersionError::NotFound {
                        doc: doc.to_path_buf(),
                        id,
                    })?
            }
        };
        Ok(Resolved { selector, text })
    }

    fn ensure_versioned(&self, doc: &Path) -> Result<(), VersionError> {
        if self.config.is_versioned(doc) {
            Ok(())
        } else {
            Err(VersionError::Unsupported {
                doc: doc.to_path_buf(),
            })
        }
    }
}
