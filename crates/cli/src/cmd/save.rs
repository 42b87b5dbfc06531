//! Save a document and record its revision

use crate::config;
use crate::util;
use anyhow::{Context, Result};
use folio_core::store::atomic_write;
use folio_core::RevisionId;
use folio_history::{CommitOutcome, History, Registry, SaveEvent, VersionsPlugin};
use folio_ledger::{Actor, Ledger, LedgerEntry, RecordOutcome};
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub struct SaveArgs {
    pub doc: PathBuf,
    pub file: Option<PathBuf>,
    pub user: Option<String>,
    pub ip: Option<String>,
    pub note: Option<String>,
    pub at: Option<RevisionId>,
}

pub async fn run(args: SaveArgs) -> Result<()> {
    let config = config::load()?;

    let mut text = util::read_input(args.file.as_deref())?;
    if config.editor.unix_eol {
        text = text.replace('\r', "");
    }

    let doc = args.doc;
    let previous = util::read_optional(&doc)?;

    if let Some(parent) = doc.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    atomic_write(&doc, text.as_bytes())
        .with_context(|| format!("Failed to write {}", doc.display()))?;

    let actor = Actor::new(
        args.ip.unwrap_or_else(|| config.editor.default_ip.clone()),
        args.user.unwrap_or_else(|| config.editor.default_user.clone()),
    );
    let timestamp = args.at.unwrap_or_else(RevisionId::now);
    let mut entry = LedgerEntry::new(timestamp, actor);
    if let Some(note) = args.note {
        entry = entry.with_note(note);
    }

    let mut ledger = Ledger::open(&doc).context("Failed to open change log")?;
    let recorded = ledger.record_save(previous.is_some(), entry);
    ledger.save().context("Failed to write change log")?;

    // Revision bookkeeping is blocking file I/O under a lock
    let history_config = config.history.clone();
    let hook_doc = doc.clone();
    let (outcome, warnings) = tokio::task::spawn_blocking(move || -> Result<_> {
        let registry = Registry::builder()
            .with(VersionsPlugin::new(History::new(history_config)))
            .build();
        let mut event = SaveEvent::new(&hook_doc, previous.as_deref(), &text, &ledger);
        registry
            .dispatch_after_save(&mut event)
            .context("Failed to record revision")?;
        Ok((event.outcome, event.warnings))
    })
    .await
    .context("Revision task failed")??;

    println!("{} Saved {}", "✓".green(), doc.display().to_string().cyan());
    match recorded {
        RecordOutcome::Created => println!("  {}", "New document".dimmed()),
        RecordOutcome::Merged => println!("  {}", "Merged into today's change-log entry".dimmed()),
        RecordOutcome::Appended => {}
    }

    match outcome {
        Some(CommitOutcome::Recorded { id, kind, folded }) => {
            print!("  Revision {} ({})", id.to_string().yellow(), kind);
            if folded > 0 {
                print!(" {}", format!("[{} folded]", folded).dimmed());
            }
            println!();
        }
        Some(CommitOutcome::Skipped(reason)) => {
            tracing::debug!(?reason, "no revision recorded");
        }
        None => {}
    }

    for warning in warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }

    Ok(())
}
