//! Show the revision list of a document

use crate::config;
use crate::util;
use anyhow::{Context, Result};
use folio_history::{History, Selector};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(doc: &Path, limit: Option<usize>) -> Result<()> {
    let config = config::load()?;
    let history = History::new(config.history);

    let rows = history
        .versions(doc)
        .with_context(|| format!("Failed to list revisions of {}", doc.display()))?;
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    println!("{} {}", "Revisions of".bold(), doc.display().to_string().cyan());
    println!();

    for row in &rows[..shown] {
        let target = match row.target {
            Selector::Current => "~".to_string(),
            Selector::Revision(id) => id.to_string(),
        };
        let label = row.label.unwrap_or("");

        let when = if row.timestamp.as_secs() == 0 {
            "Unknown time".to_string()
        } else {
            format!(
                "{} {}",
                row.timestamp.format_date(),
                format!("({})", util::format_relative_time(row.timestamp.as_secs())).dimmed()
            )
        };

        println!("{:<12} {:<8} {}", target.yellow(), label.bold(), when);

        if let Some(entry) = &row.entry {
            println!("             {}", entry.actor.to_string().dimmed());
            for note in &entry.notes {
                println!("             {}", note);
            }
        }
    }

    if shown < rows.len() {
        println!("\n{} ({} older revisions omitted)", "...".dimmed(), rows.len() - shown);
    }

    Ok(())
}
