//! Line-based diff/patch codec
//!
//! Patches are unified diffs (`@@ -l,n +l,n @@` hunks). The builtin codec
//! computes them in-process with `similar` and applies them with a strict
//! applier; [`ExternalCodec`] shells out to `diff -u` / `patch` over scratch
//! files that are removed on every exit path.

use serde::{Deserialize, Serialize};
use similar::TextDiff;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Context lines around each hunk
pub const CONTEXT_RADIUS: usize = 3;

/// Produces and applies textual patches
pub trait Codec: Send + Sync {
    /// Patch transforming `a` into `b`, `None` if it cannot be computed
    fn diff(&self, a: &str, b: &str) -> Option<String>;

    /// Apply `patch` to `original`, `None` if it does not apply cleanly
    fn patch(&self, original: &str, patch: &str) -> Option<String>;
}

/// Which codec implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// In-process diff and patch
    #[default]
    Builtin,
    /// `diff` / `patch` binaries
    External,
}

impl CodecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecKind::Builtin => "builtin",
            CodecKind::External => "external",
        }
    }

    /// Instantiate the codec; `scratch_root` is only used by the external one
    pub fn build(&self, scratch_root: Option<&Path>) -> Box<dyn Codec> {
        match self {
            CodecKind::Builtin => Box::new(BuiltinCodec),
            CodecKind::External => Box::new(ExternalCodec::new(
                scratch_root
                    .map(Path::to_path_buf)
                    .unwrap_or_else(std::env::temp_dir),
            )),
        }
    }
}

impl std::str::FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "builtin" => Ok(CodecKind::Builtin),
            "external" => Ok(CodecKind::External),
            other => Err(format!("unknown codec '{}' (expected builtin or external)", other)),
        }
    }
}

/// Check if content is binary (contains null bytes in first 8KB)
pub fn is_binary(content: &str) -> bool {
    content.as_bytes().iter().take(8192).any(|&b| b == 0)
}

/// A `\r` not followed by `\n` ends a line for the differ but not for
/// the applier, so such texts are stored as rewrites
fn has_lone_cr(content: &str) -> bool {
    let bytes = content.as_bytes();
    bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| b == b'\r' && bytes.get(i + 1) != Some(&b'\n'))
}

/// In-process Myers diff + strict unified-diff applier
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCodec;

impl Codec for BuiltinCodec {
    fn diff(&self, a: &str, b: &str) -> Option<String> {
        if is_binary(a) || is_binary(b) || has_lone_cr(a) || has_lone_cr(b) {
            return None;
        }
        let diff = TextDiff::from_lines(a, b);
        let patch = diff
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header("a", "b")
            .to_string();
        Some(patch)
    }

    fn patch(&self, original: &str, patch: &str) -> Option<String> {
        let hunks = parse_patch(patch)?;
        apply_hunks(original, &hunks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineTag {
    Context,
    Delete,
    Insert,
}

#[derive(Debug)]
struct Hunk {
    old_start: usize,
    old_len: usize,
    lines: Vec<(LineTag, String)>,
}

/// Parse `-l,n` / `+l,n` (length defaults to 1)
fn parse_range(field: &str, sign: char) -> Option<(usize, usize)> {
    let body = field.strip_prefix(sign)?;
    match body.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((body.parse().ok()?, 1)),
    }
}

fn parse_hunk_header(row: &str) -> Option<(usize, usize, usize, usize)> {
    let mut fields = row.strip_prefix("@@")?.split_whitespace();
    let (old_start, old_len) = parse_range(fields.next()?, '-')?;
    let (new_start, new_len) = parse_range(fields.next()?, '+')?;
    if fields.next()? != "@@" {
        return None;
    }
    Some((old_start, old_len, new_start, new_len))
}

/// Parse unified-diff text into hunks. Rows before the first hunk (file
/// headers) are ignored; hunk bodies are consumed by their declared counts.
fn parse_patch(patch: &str) -> Option<Vec<Hunk>> {
    let mut rows: Vec<&str> = patch.split('\n').collect();
    if patch.ends_with('\n') || patch.is_empty() {
        rows.pop();
    }

    let mut hunks = Vec::new();
    let mut i = 0;
    while i < rows.len() {
        if !rows[i].starts_with("@@") {
            i += 1;
            continue;
        }
        let (old_start, old_len, _new_start, new_len) = parse_hunk_header(rows[i])?;
        i += 1;

        let mut lines: Vec<(LineTag, String)> = Vec::new();
        let (mut old_seen, mut new_seen) = (0usize, 0usize);
        while old_seen < old_len || new_seen < new_len {
            let row = rows.get(i)?;
            i += 1;
            let tag = match row.as_bytes().first() {
                Some(b' ') | None => LineTag::Context,
                Some(b'-') => LineTag::Delete,
                Some(b'+') => LineTag::Insert,
                Some(b'\\') => {
                    strip_newline(&mut lines)?;
                    continue;
                }
                Some(_) => return None,
            };
            match tag {
                LineTag::Context => {
                    old_seen += 1;
                    new_seen += 1;
                }
                LineTag::Delete => old_seen += 1,
                LineTag::Insert => new_seen += 1,
            }
            if old_seen > old_len || new_seen > new_len {
                return None;
            }
            let text = row.get(1..).unwrap_or("");
            lines.push((tag, format!("{}\n", text)));
        }
        while let Some(row) = rows.get(i) {
            if !row.starts_with('\\') {
                break;
            }
            strip_newline(&mut lines)?;
            i += 1;
        }

        hunks.push(Hunk {
            old_start,
            old_len,
            lines,
        });
    }
    Some(hunks)
}

/// Handle a `\ No newline at end of file` marker
fn strip_newline(lines: &mut [(LineTag, String)]) -> Option<()> {
    let (_, text) = lines.last_mut()?;
    text.pop();
    Some(())
}

fn apply_hunks(original: &str, hunks: &[Hunk]) -> Option<String> {
    let source: Vec<&str> = original.split_inclusive('\n').collect();
    let mut out = String::with_capacity(original.len());
    let mut cursor = 0usize;

    for hunk in hunks {
        let start = if hunk.old_len == 0 {
            hunk.old_start
        } else {
            hunk.old_start.checked_sub(1)?
        };
        if start < cursor || start > source.len() {
            return None;
        }
        for line in &source[cursor..start] {
            out.push_str(line);
        }

        let mut pos = start;
        for (tag, text) in &hunk.lines {
            match tag {
                LineTag::Context | LineTag::Delete => {
                    if source.get(pos) != Some(&text.as_str()) {
                        return None;
                    }
                    if *tag == LineTag::Context {
                        out.push_str(text);
                    }
                    pos += 1;
                }
                LineTag::Insert => out.push_str(text),
            }
        }
        cursor = pos;
    }

    for line in &source[cursor..] {
        out.push_str(line);
    }
    Some(out)
}

fn has_hunks(patch: &str) -> bool {
    patch.split('\n').any(|row| row.starts_with("@@"))
}

/// Codec backed by the system `diff` and `patch` programs
///
/// Every call works inside a fresh scratch directory under `scratch_root`;
/// the directory is deleted when the call returns, whatever the outcome.
#[derive(Debug, Clone)]
pub struct ExternalCodec {
    scratch_root: PathBuf,
}

impl ExternalCodec {
    pub fn new(scratch_root: PathBuf) -> Self {
        Self { scratch_root }
    }

    fn scratch(&self) -> std::io::Result<tempfile::TempDir> {
        tempfile::Builder::new()
            .prefix("folio-")
            .tempdir_in(&self.scratch_root)
    }

    fn run_diff(&self, a: &str, b: &str) -> std::io::Result<Option<String>> {
        let dir = self.scratch()?;
        let path_a = dir.path().join("a");
        let path_b = dir.path().join("b");
        std::fs::write(&path_a, a)?;
        std::fs::write(&path_b, b)?;

        let output = Command::new("diff")
            .args(["-u", "-L", "a", "-L", "b"])
            .arg(&path_a)
            .arg(&path_b)
            .output()?;

        // 0 = identical, 1 = differences, anything else is trouble
        Ok(match output.status.code() {
            Some(0) => Some(String::new()),
            Some(1) => String::from_utf8(output.stdout).ok(),
            _ => {
                tracing::warn!(
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "diff failed"
                );
                None
            }
        })
    }

    fn run_patch(&self, original: &str, patch: &str) -> std::io::Result<Option<String>> {
        let dir = self.scratch()?;
        let path_orig = dir.path().join("orig");
        let path_patch = dir.path().join("patch");
        let path_rej = dir.path().join("rej");
        std::fs::write(&path_orig, original)?;
        std::fs::write(&path_patch, patch)?;

        let output = Command::new("patch")
            .args(["-s", "-f", "-r"])
            .arg(&path_rej)
            .arg(&path_orig)
            .arg(&path_patch)
            .output()?;

        if !output.status.success() {
            tracing::warn!(
                stdout = %String::from_utf8_lossy(&output.stdout),
                "patch did not apply"
            );
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path_orig)?))
    }
}

impl Codec for ExternalCodec {
    fn diff(&self, a: &str, b: &str) -> Option<String> {
        if is_binary(a) || is_binary(b) {
            return None;
        }
        self.run_diff(a, b).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "diff scratch I/O failed");
            None
        })
    }

    fn patch(&self, original: &str, patch: &str) -> Option<String> {
        if !has_hunks(patch) {
            return Some(original.to_string());
        }
        self.run_patch(original, patch).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "patch scratch I/O failed");
            None
        })
    }
}
