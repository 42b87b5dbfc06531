//! On-disk revision store for a single document
//!
//! Each document `<dir>/<name>` gets a sibling store `<dir>/.vers;<name>`:
//! ```json
//! { "root": "<latest full text>",
//!   "<revisionId>": ["rewrite", "<full text>"],
//!   "<revisionId>": ["delta", "<unified diff text>"] }
//! ```
//! Stores written by older releases live in a YAML sibling `.ver;<name>`.
//! They are read when no JSON store exists and are never written.

use crate::error::VersionError;
use crate::id::RevisionId;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Prefix of the JSON store file
pub const STORE_PREFIX: &str = ".vers;";
/// Prefix of the read-only legacy YAML store file
pub const LEGACY_STORE_PREFIX: &str = ".ver;";

const ROOT_KEY: &str = "root";

/// Kind of chain entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Patch against the next newer revision
    Delta,
    /// Full snapshot
    Rewrite,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Delta => "delta",
            EntryKind::Rewrite => "rewrite",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chain entry keyed by revision id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionEntry {
    /// Patch that turns the next newer text into this revision's text
    Delta(String),
    /// Self-contained text of this revision
    Rewrite(String),
}

impl RevisionEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            RevisionEntry::Delta(_) => EntryKind::Delta,
            RevisionEntry::Rewrite(_) => EntryKind::Rewrite,
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            RevisionEntry::Delta(p) | RevisionEntry::Rewrite(p) => p,
        }
    }

    pub fn is_rewrite(&self) -> bool {
        matches!(self, RevisionEntry::Rewrite(_))
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, RevisionEntry::Delta(_))
    }
}

/// Where a loaded store came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSource {
    /// No store file yet
    Missing,
    /// `.vers;<name>`
    Json,
    /// `.ver;<name>`
    LegacyYaml,
}

/// Per-document revision chain: a root snapshot plus id-keyed entries
#[derive(Debug, Clone)]
pub struct RevisionStore {
    /// JSON store path (always the write target)
    path: PathBuf,
    /// Text of the most recent save
    root: Option<String>,
    /// Chain entries, oldest first
    entries: BTreeMap<RevisionId, RevisionEntry>,
    source: StoreSource,
}

impl RevisionStore {
    /// Empty store for `doc`
    pub fn empty(doc: &Path) -> Self {
        Self {
            path: store_path(doc),
            root: None,
            entries: BTreeMap::new(),
            source: StoreSource::Missing,
        }
    }

    /// Load the store for `doc`, falling back to the legacy YAML store,
    /// then to an empty store
    pub fn load(doc: &Path) -> Result<Self, VersionError> {
        let path = store_path(doc);
        if let Some(text) = read_optional(&path)? {
            let value: Value = serde_json::from_str(&text)
                .map_err(|e| VersionError::format(&path, e.to_string()))?;
            return Self::from_value(path.clone(), &path, value, StoreSource::Json);
        }

        let legacy = legacy_store_path(doc);
        if let Some(text) = read_optional(&legacy)? {
            tracing::debug!(path = %legacy.display(), "reading legacy YAML store");
            let yaml: serde_yaml::Value = serde_yaml::from_str(&text)
                .map_err(|e| VersionError::format(&legacy, e.to_string()))?;
            let value = serde_json::to_value(yaml)
                .map_err(|e| VersionError::format(&legacy, e.to_string()))?;
            return Self::from_value(path, &legacy, value, StoreSource::LegacyYaml);
        }

        Ok(Self::empty(doc))
    }

    fn from_value(
        path: PathBuf,
        origin: &Path,
        value: Value,
        source: StoreSource,
    ) -> Result<Self, VersionError> {
        let map = match value {
            Value::Object(map) => map,
            // An empty YAML document
            Value::Null => Map::new(),
            other => {
                return Err(VersionError::format(
                    origin,
                    format!("expected a mapping, found {}", json_kind(&other)),
                ))
            }
        };

        let mut root = None;
        let mut entries = BTreeMap::new();
        for (key, value) in map {
            if key == ROOT_KEY {
                root = match value {
                    Value::Null => None,
                    Value::String(text) => Some(text),
                    other => {
                        return Err(VersionError::format(
                            origin,
                            format!("root must be text, found {}", json_kind(&other)),
                        ))
                    }
                };
                continue;
            }

            let id: RevisionId = key
                .parse()
                .map_err(|e: crate::id::ParseRevisionIdError| VersionError::format(origin, e.to_string()))?;
            let entry = parse_entry(origin, id, value)?;
            entries.insert(id, entry);
        }

        Ok(Self {
            path,
            root,
            entries,
            source,
        })
    }

    /// Serialize to the JSON store format
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            ROOT_KEY.to_string(),
            self.root.clone().map(Value::String).unwrap_or(Value::Null),
        );
        for (id, entry) in &self.entries {
            map.insert(
                id.to_string(),
                Value::Array(vec![
                    Value::String(entry.kind().as_str().to_string()),
                    Value::String(entry.payload().to_string()),
                ]),
            );
        }
        Value::Object(map)
    }

    /// Atomically rewrite the JSON store file
    pub fn save(&self) -> Result<(), VersionError> {
        let bytes = serde_json::to_vec(&self.to_json())
            .map_err(|e| VersionError::format(&self.path, e.to_string()))?;
        atomic_write(&self.path, &bytes).map_err(|e| VersionError::storage(&self.path, e))?;
        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "revision store saved"
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> StoreSource {
        self.source
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn set_root(&mut self, text: String) {
        self.root = Some(text);
    }

    pub fn get(&self, id: RevisionId) -> Option<&RevisionEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: RevisionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn insert(&mut self, id: RevisionId, entry: RevisionEntry) -> Option<RevisionEntry> {
        self.entries.insert(id, entry)
    }

    pub fn remove(&mut self, id: RevisionId) -> Option<RevisionEntry> {
        self.entries.remove(&id)
    }

    /// Entries, oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = (RevisionId, &RevisionEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Entries strictly newer than `id`, newest first
    pub fn newer_than(&self, id: RevisionId) -> Vec<(RevisionId, &RevisionEntry)> {
        use std::ops::Bound::{Excluded, Unbounded};
        self.entries
            .range((Excluded(id), Unbounded))
            .rev()
            .map(|(id, entry)| (*id, entry))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(origin: &Path, id: RevisionId, value: Value) -> Result<RevisionEntry, VersionError> {
    let Value::Array(parts) = value else {
        return Err(VersionError::format(
            origin,
            format!("entry {} must be a [kind, payload] pair", id),
        ));
    };
    let (kind, payload) = match parts.as_slice() {
        [Value::String(kind), Value::String(payload)] => (kind.as_str(), payload.clone()),
        _ => {
            return Err(VersionError::format(
                origin,
                format!("entry {} must be a [kind, payload] pair", id),
            ))
        }
    };
    match kind {
        "delta" => Ok(RevisionEntry::Delta(payload)),
        "rewrite" => Ok(RevisionEntry::Rewrite(payload)),
        other => Err(VersionError::consistency(
            id,
            format!("{}: invalid entry kind", other),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, VersionError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(VersionError::storage(path, e)),
    }
}

/// `<dir>/<prefix><basename>` for a document path
pub fn sibling_path(doc: &Path, prefix: &str) -> PathBuf {
    let name = doc
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = format!("{}{}", prefix, name);
    match doc.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}

/// Path of the JSON revision store for `doc`
pub fn store_path(doc: &Path) -> PathBuf {
    sibling_path(doc, STORE_PREFIX)
}

/// Path of the legacy YAML revision store for `doc`
pub fn legacy_store_path(doc: &Path) -> PathBuf {
    sibling_path(doc, LEGACY_STORE_PREFIX)
}

/// Directory containing `path`, `.` for bare file names
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Atomic write helper
///
/// Writes data to a temporary file in the target's directory, fsyncs it,
/// then renames it over the target.
pub fn atomic_write(target: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = parent_dir(target);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    sync_dir(dir);
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(handle) = std::fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

/// Check if a path is one of the engine's sibling files
pub fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| {
            n.starts_with(STORE_PREFIX)
                || n.starts_with(LEGACY_STORE_PREFIX)
                || n.starts_with(".props;")
                || n.starts_with(".lock;")
        })
        .unwrap_or(false)
}
