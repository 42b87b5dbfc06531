//! Show a document, optionally at a previous revision

use crate::config;
use anyhow::{Context, Result};
use folio_history::{History, Registry, RenderEvent, Selector, VersionsPlugin};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(doc: &Path, version: Option<&str>, raw: bool) -> Result<()> {
    let config = config::load()?;

    let selector = match version {
        Some(v) => v.parse::<Selector>().map_err(anyhow::Error::msg)?,
        None => Selector::Current,
    };

    if raw {
        let text = match selector {
            Selector::Current => std::fs::read_to_string(doc)
                .with_context(|| format!("Failed to read {}", doc.display()))?,
            Selector::Revision(id) => History::new(config.history).raw(doc, id)?,
        };
        print!("{}", text);
        return Ok(());
    }

    let source = std::fs::read_to_string(doc)
        .with_context(|| format!("Failed to read {}", doc.display()))?;
    let version = match selector {
        Selector::Current => None,
        Selector::Revision(id) => Some(id),
    };

    let registry = Registry::builder()
        .with(VersionsPlugin::new(History::new(config.history)))
        .build();
    let mut event = RenderEvent::new(doc, version, source);
    registry.dispatch_before_render(&mut event)?;

    println!("{} {}", "document".yellow().bold(), doc.display().to_string().cyan());
    for note in &event.annotations {
        println!("{}", note.yellow());
    }
    println!();
    print!("{}", event.source);

    Ok(())
}
