//! Revision identifiers

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A revision id: the unix timestamp (seconds) of the ledger entry it belongs to
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct RevisionId(u64);

impl RevisionId {
    /// Lower bound used when a ledger has no previous entry
    pub const ORIGIN: RevisionId = RevisionId(0);

    /// Create a revision id from unix seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Revision id for the current wall-clock time
    pub fn now() -> Self {
        Self(Utc::now().timestamp().max(0) as u64)
    }

    /// Unix seconds
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// The next second, `None` past the representable range
    pub fn checked_next(&self) -> Option<Self> {
        let next = Self(self.0.checked_add(1)?);
        next.to_datetime().map(|_| next)
    }

    /// UTC timestamp, `None` if out of chrono's range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// UTC calendar date of this revision
    pub fn date(&self) -> Option<NaiveDate> {
        self.to_datetime().map(|dt| dt.date_naive())
    }

    /// True when both ids fall on the same UTC calendar date
    pub fn same_day(&self, other: RevisionId) -> bool {
        match (self.date(), other.date()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Format as `YYYY-MM-DD HH:MM:SS` (UTC)
    pub fn format_date(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "Unknown time".to_string(),
        }
    }
}

/// Error returned when a revision id cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid revision id: {0:?}")]
pub struct ParseRevisionIdError(pub String);

impl FromStr for RevisionId {
    type Err = ParseRevisionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Ids must map to a calendar date for day merging and display
        s.trim()
            .parse::<u64>()
            .ok()
            .map(Self)
            .filter(|id| id.to_datetime().is_some())
            .ok_or_else(|| ParseRevisionIdError(s.to_string()))
    }
}

impl std::fmt::Debug for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RevisionId({})", self.0)
    }
}

impl std::fmt::Display for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RevisionId {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}
