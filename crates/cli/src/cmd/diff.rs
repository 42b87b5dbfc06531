//! Compare two revisions of a document

use crate::config;
use crate::diff_utils;
use anyhow::{Context, Result};
use folio_history::{History, Selector};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(doc: &Path, a: &str, b: &str, context: usize) -> Result<()> {
    let config = config::load()?;
    let history = History::new(config.history);

    let a: Selector = a.parse().map_err(anyhow::Error::msg)?;
    let b: Selector = b.parse().map_err(anyhow::Error::msg)?;

    let cmp = history
        .compare(doc, a, b)
        .with_context(|| format!("Failed to compare revisions of {}", doc.display()))?;

    println!("{} {}", "---".red(), describe(cmp.a.selector));
    println!("{} {}", "+++".green(), describe(cmp.b.selector));

    if cmp.is_identical() {
        println!("\n{}", "No differences".dimmed());
        return Ok(());
    }
    if cmp.patch.is_none() {
        println!("\n{}", "Binary content differs".yellow());
        return Ok(());
    }

    let (added, removed) = diff_utils::change_stats(&cmp.a.text, &cmp.b.text);
    println!(
        "{} {}",
        format!("+{}", added).green(),
        format!("-{}", removed).red()
    );
    println!();
    print!(
        "{}",
        diff_utils::generate_unified_diff(&cmp.a.text, &cmp.b.text, context)
    );

    Ok(())
}

fn describe(selector: Selector) -> String {
    match selector {
        Selector::Current => "Current".to_string(),
        Selector::Revision(id) => format!("{} ({})", id, selector.label()),
    }
}
