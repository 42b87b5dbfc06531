//! Change-log entries

use folio_core::RevisionId;
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Who made a change
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor {
    /// Remote address of the editor
    pub ip: String,
    /// Authenticated user name (may be empty)
    pub user: String,
}

impl Actor {
    pub fn new(ip: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user: user.into(),
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.user.is_empty() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.user, self.ip)
        }
    }
}

/// A single change-log entry
///
/// Serialized as `[timestamp, ip, user]` or `[timestamp, ip, user, [notes...]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Time of the (latest) save; doubles as the revision id
    pub timestamp: RevisionId,
    /// Editor
    pub actor: Actor,
    /// Free-form notes, appended when entries merge
    pub notes: Vec<String>,
}

impl LedgerEntry {
    pub fn new(timestamp: RevisionId, actor: Actor) -> Self {
        Self {
            timestamp,
            actor,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Same actor on the same calendar day
    pub fn merges_with(&self, other: &LedgerEntry) -> bool {
        self.actor == other.actor && self.timestamp.same_day(other.timestamp)
    }
}

impl Serialize for LedgerEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.notes.is_empty() { 3 } else { 4 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.timestamp)?;
        seq.serialize_element(&self.actor.ip)?;
        seq.serialize_element(&self.actor.user)?;
        if !self.notes.is_empty() {
            seq.serialize_element(&self.notes)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for LedgerEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Notes(RevisionId, String, String, Vec<String>),
            Note(RevisionId, String, String, String),
            Bare(RevisionId, String, String),
        }

        let (timestamp, ip, user, notes) = match Raw::deserialize(deserializer)? {
            Raw::Notes(ts, ip, user, notes) => (ts, ip, user, notes),
            Raw::Note(ts, ip, user, note) => (ts, ip, user, vec![note]),
            Raw::Bare(ts, ip, user) => (ts, ip, user, Vec::new()),
        };
        Ok(Self {
            timestamp,
            actor: Actor { ip, user },
            notes,
        })
    }
}
