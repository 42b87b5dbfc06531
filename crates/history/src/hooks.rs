//! Save/render hooks
//!
//! Hosts build a [`Registry`] once at startup and dispatch events through
//! it. Each handler answers with a [`Handled`] value:
//! - `NotHandled`: the event was ignored
//! - `Continue`: handled, keep dispatching
//! - `Stop`: handled, skip the remaining handlers

use crate::endpoints::History;
use crate::writer::CommitOutcome;
use folio_core::{RevisionId, VersionError};
use folio_ledger::Ledger;
use std::path::Path;

/// Handler answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    NotHandled,
    Continue,
    Stop,
}

/// A document was written to disk
pub struct SaveEvent<'a> {
    pub doc: &'a Path,
    /// Content before the save, `None` for a new document
    pub previous: Option<&'a str>,
    /// Content as written
    pub text: &'a str,
    /// Ledger already updated for this save
    pub ledger: &'a Ledger,
    /// Set by the history plugin
    pub outcome: Option<CommitOutcome>,
    /// Non-fatal problems reported by handlers
    pub warnings: Vec<String>,
}

impl<'a> SaveEvent<'a> {
    pub fn new(doc: &'a Path, previous: Option<&'a str>, text: &'a str, ledger: &'a Ledger) -> Self {
        Self {
            doc,
            previous,
            text,
            ledger,
            outcome: None,
            warnings: Vec::new(),
        }
    }
}

/// A document is about to be rendered
pub struct RenderEvent<'a> {
    pub doc: &'a Path,
    /// Requested historical revision, `None` for the live document
    pub version: Option<RevisionId>,
    /// Source text to render
    pub source: String,
    /// Notes shown above the rendered document
    pub annotations: Vec<String>,
}

impl<'a> RenderEvent<'a> {
    pub fn new(doc: &'a Path, version: Option<RevisionId>, source: String) -> Self {
        Self {
            doc,
            version,
            source,
            annotations: Vec::new(),
        }
    }
}

/// Event handlers; every hook defaults to `NotHandled`
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn after_save(&self, _event: &mut SaveEvent<'_>) -> Result<Handled, VersionError> {
        Ok(Handled::NotHandled)
    }

    fn before_render(&self, _event: &mut RenderEvent<'_>) -> Result<Handled, VersionError> {
        Ok(Handled::NotHandled)
    }
}

/// Immutable set of plugins, in dispatch order
pub struct Registry {
    plugins: Vec<Box<dyn Plugin>>,
}

/// Builder for [`Registry`]
#[derive(Default)]
pub struct RegistryBuilder {
    plugins: Vec<Box<dyn Plugin>>,
}

impl RegistryBuilder {
    pub fn with(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            plugins: self.plugins,
        }
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn dispatch_after_save(&self, event: &mut SaveEvent<'_>) -> Result<Handled, VersionError> {
        dispatch(&self.plugins, |plugin| plugin.after_save(event))
    }

    pub fn dispatch_before_render(
        &self,
        event: &mut RenderEvent<'_>,
    ) -> Result<Handled, VersionError> {
        dispatch(&self.plugins, |plugin| plugin.before_render(event))
    }
}

fn dispatch<F>(plugins: &[Box<dyn Plugin>], mut call: F) -> Result<Handled, VersionError>
where
    F: FnMut(&dyn Plugin) -> Result<Handled, VersionError>,
{
    let mut result = Handled::NotHandled;
    for plugin in plugins {
        match call(plugin.as_ref())? {
            Handled::NotHandled => {}
            Handled::Continue => result = Handled::Continue,
            Handled::Stop => {
                tracing::trace!(plugin = plugin.name(), "dispatch stopped");
                return Ok(Handled::Stop);
            }
        }
    }
    Ok(result)
}

/// Records revisions on save and serves them on render
pub struct VersionsPlugin {
    history: History,
}

impl VersionsPlugin {
    pub fn new(history: History) -> Self {
        Self { history }
    }
}

impl Plugin for VersionsPlugin {
    fn name(&self) -> &'static str {
        "versions"
    }

    fn after_save(&self, event: &mut SaveEvent<'_>) -> Result<Handled, VersionError> {
        match self
            .history
            .commit(event.doc, event.previous, event.text, event.ledger)
        {
            Ok(outcome) => {
                event.outcome = Some(outcome);
                Ok(Handled::Continue)
            }
            Err(e) if self.history.config().strict => Err(e),
            Err(e) => {
                tracing::warn!(doc = %event.doc.display(), error = %e, "revision not recorded");
                event.warnings.push(e.to_string());
                Ok(Handled::Continue)
            }
        }
    }

    fn before_render(&self, event: &mut RenderEvent<'_>) -> Result<Handled, VersionError> {
        let Some(version) = event.version else {
            return Ok(Handled::NotHandled);
        };

        event.source = self.history.raw(event.doc, version)?;
        event.annotations.push(format!(
            "NOTE: This is a previous version dated {}.",
            version.format_date()
        ));
        Ok(Handled::Continue)
    }
}
