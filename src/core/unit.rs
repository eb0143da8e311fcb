//! Template unit state
//!
//! A [`TemplateUnit`] carries one template through its lifecycle: raw
//! source text, the compiled executable form, and file metadata, together
//! with the signals it emits and the sink its output is appended to. The
//! executor is the only mutator of the load/compile state; the unit itself
//! is inert data.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::TemplateSettings;
use crate::engine::CompiledTemplate;
use crate::sink::OutputSink;

use super::signal::Signals;

/// Runs of two or more dots collapse to a single dot, which keeps
/// traversal segments from escaping the configured root.
static TRAVERSAL_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\.+").unwrap());

/// Collapse parent-directory traversal segments in an identifier.
///
/// Idempotent: the result never contains two consecutive dots.
pub fn strip_traversal(identifier: &str) -> Cow<'_, str> {
    TRAVERSAL_DOTS.replace_all(identifier, ".")
}

/// Append the default document to identifiers that denote a directory.
pub fn qualify_identifier(identifier: &str, default_document: &str) -> String {
    if identifier.ends_with('/') || identifier.is_empty() {
        format!("{identifier}{default_document}")
    } else {
        identifier.to_string()
    }
}

/// File metadata captured when a template's source is loaded.
///
/// Feeds cache-validation headers; compilation does not depend on it.
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl From<&std::fs::Metadata> for SourceMetadata {
    fn from(meta: &std::fs::Metadata) -> Self {
        Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        }
    }
}

/// One template's source, compiled form, and execution target
pub struct TemplateUnit {
    identifier: String,
    raw_source: Option<String>,
    compiled: Option<Arc<dyn CompiledTemplate>>,
    metadata: Option<SourceMetadata>,
    signals: Arc<Signals>,
    sink: Arc<dyn OutputSink>,
    settings: Arc<TemplateSettings>,
}

impl TemplateUnit {
    /// Create a file-backed unit for the given identifier.
    ///
    /// Directory identifiers (trailing separator) get the configured
    /// default document appended. The source is loaded on first execution.
    pub fn for_identifier(
        identifier: &str,
        settings: Arc<TemplateSettings>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        let identifier = qualify_identifier(identifier, &settings.default_document);
        Self {
            identifier,
            raw_source: None,
            compiled: None,
            metadata: None,
            signals: Arc::new(Signals::new()),
            sink,
            settings,
        }
    }

    /// Create a unit from source text supplied directly.
    ///
    /// Direct-source units never touch the filesystem.
    pub fn from_source(
        source: impl Into<String>,
        settings: Arc<TemplateSettings>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            identifier: String::new(),
            raw_source: Some(source.into()),
            compiled: None,
            metadata: None,
            signals: Arc::new(Signals::new()),
            sink,
            settings,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The raw source text, if present and non-empty.
    ///
    /// An empty string counts as "not yet loaded", so units created for an
    /// identifier always load from file.
    pub fn raw_source(&self) -> Option<&str> {
        self.raw_source.as_deref().filter(|s| !s.is_empty())
    }

    pub fn compiled(&self) -> Option<Arc<dyn CompiledTemplate>> {
        self.compiled.clone()
    }

    pub fn metadata(&self) -> Option<&SourceMetadata> {
        self.metadata.as_ref()
    }

    pub fn signals(&self) -> &Arc<Signals> {
        &self.signals
    }

    pub fn sink(&self) -> &Arc<dyn OutputSink> {
        &self.sink
    }

    pub fn settings(&self) -> &Arc<TemplateSettings> {
        &self.settings
    }

    /// The on-disk path this unit's identifier resolves to.
    pub fn resolved_path(&self) -> PathBuf {
        let stripped = strip_traversal(&self.identifier);
        self.settings
            .root
            .join(stripped.trim_start_matches(['/', '\\']))
    }

    pub(crate) fn set_raw_source(&mut self, source: String) {
        self.raw_source = Some(source);
    }

    pub(crate) fn set_metadata(&mut self, metadata: SourceMetadata) {
        self.metadata = Some(metadata);
    }

    pub(crate) fn set_compiled(&mut self, compiled: Arc<dyn CompiledTemplate>) {
        self.compiled = Some(compiled);
    }
}
