//! Report versioned documents under a directory

use crate::config;
use crate::util;
use anyhow::{Context, Result};
use folio_core::store::{is_sidecar, store_path};
use folio_core::{RevisionStore, StoreSource};
use folio_ledger::Ledger;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// History state of one document
struct DocStatus {
    path: PathBuf,
    revisions: usize,
    ledger_entries: usize,
    store_bytes: u64,
    source: StoreSource,
}

pub async fn run(dir: Option<PathBuf>) -> Result<()> {
    let config = config::load()?;
    let root = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let mut documents = Vec::new();
    let mut broken = Vec::new();

    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e.path(), e.file_type().is_dir()));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || is_sidecar(path) || !config.history.is_versioned(path) {
            continue;
        }

        match inspect(path) {
            Ok(status) => documents.push(status),
            Err(e) => broken.push((path.to_path_buf(), e)),
        }
    }

    println!("{}", "History Status".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("Directory:     {}", root.display().to_string().cyan());
    println!(
        "History:       {}",
        if config.history.enabled {
            "enabled".green().to_string()
        } else {
            "disabled".yellow().to_string()
        }
    );
    println!("Codec:         {}", config.history.codec.as_str());
    println!();

    let with_history = documents.iter().filter(|d| d.revisions > 0).count();
    for doc in &documents {
        let relative = doc.path.strip_prefix(&root).unwrap_or(&doc.path);
        let mut line = format!(
            "  {:<40} {:>3} revisions  {:>3} log entries  {:>9}",
            relative.display().to_string(),
            doc.revisions,
            doc.ledger_entries,
            util::format_size(doc.store_bytes)
        );
        if doc.source == StoreSource::LegacyYaml {
            line.push_str("  (legacy store)");
        }
        if doc.revisions == 0 {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }

    for (path, error) in &broken {
        let relative = path.strip_prefix(&root).unwrap_or(path);
        println!("  {:<40} {} {}", relative.display().to_string(), "error:".red().bold(), error);
    }

    println!();
    println!(
        "Documents:     {} ({} with history)",
        documents.len() + broken.len(),
        with_history
    );
    if !broken.is_empty() {
        println!("Unreadable:    {}", broken.len().to_string().red());
    }

    Ok(())
}

fn inspect(doc: &Path) -> Result<DocStatus, folio_core::VersionError> {
    let store = RevisionStore::load(doc)?;
    let ledger = Ledger::open(doc)?;
    let store_bytes = std::fs::metadata(store_path(doc))
        .map(|m| m.len())
        .unwrap_or(0);
    Ok(DocStatus {
        path: doc.to_path_buf(),
        revisions: store.len(),
        ledger_entries: ledger.len(),
        store_bytes,
        source: store.source(),
    })
}

fn is_hidden_dir(path: &Path, is_dir: bool) -> bool {
    is_dir
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
}
