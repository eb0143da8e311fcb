//! Template lifecycle execution
//!
//! [`TemplateExecutor`] drives a unit from unresolved to complete:
//! resolve-or-reuse the compiled form, run the body, signal the outcome.
//! Failures at any stage are reported exactly once through the unit's
//! `error` signal and never propagate as return values past this layer.

use std::sync::Arc;

use bytes::Bytes;
use log::debug;
use serde_json::Value;

use crate::core::{
    DataContext, ExecStarted, TemplateError, TemplateResult, TemplateUnit,
};
use crate::engine::TemplateCompiler;
use crate::loader::SourceLoader;

/// Orchestrates the load/compile/execute lifecycle of template units.
///
/// The executor is the exclusive mutator of a unit's raw source, file
/// metadata, and compiled form.
pub struct TemplateExecutor {
    compiler: Arc<dyn TemplateCompiler>,
    loader: SourceLoader,
}

impl TemplateExecutor {
    pub fn new(compiler: Arc<dyn TemplateCompiler>) -> Self {
        Self {
            compiler,
            loader: SourceLoader::new(),
        }
    }

    /// Make sure the unit has an executable form.
    ///
    /// With `use_cached` set, an existing compiled form short-circuits:
    /// no I/O, no recompilation. Otherwise a unit with source text in hand
    /// compiles directly, and a file-backed unit is loaded (stat, then
    /// content read) before compiling. Errors are returned to the caller;
    /// signal dispatch is [`execute`](Self::execute)'s job so each failure
    /// is reported once.
    pub async fn ensure_compiled(
        &self,
        unit: &mut TemplateUnit,
        use_cached: bool,
    ) -> TemplateResult<()> {
        if use_cached && unit.compiled().is_some() {
            return Ok(());
        }

        if unit.raw_source().is_none() {
            debug!("loading template source for {:?}", unit.identifier());
            self.loader.load(unit).await?;
        }

        let compiled = self.compiler.compile(unit.raw_source().unwrap_or_default())?;
        unit.set_compiled(compiled);
        Ok(())
    }

    /// Run the unit against a data context.
    ///
    /// Dispatches `exec-started` once the compiled form is ready (the
    /// first observable side effect, ahead of any output byte), then the
    /// body, then exactly one of `complete` or `error`. Output already
    /// flushed before a failure is not retracted.
    pub async fn execute(&self, unit: &mut TemplateUnit, data: &DataContext) {
        if let Err(err) = self.ensure_compiled(unit, true).await {
            unit.signals().dispatch_error(&err);
            return;
        }

        let Some(compiled) = unit.compiled() else {
            let err = TemplateError::Runtime("compiled form missing after resolve".to_string());
            unit.signals().dispatch_error(&err);
            return;
        };

        unit.signals().dispatch_exec_started(ExecStarted {
            metadata: unit.metadata().cloned(),
        });

        let scope = RenderScope {
            executor: self,
            unit,
            data,
        };
        match compiled.render(&scope).await {
            Ok(()) => unit.signals().dispatch_complete(),
            Err(err) => unit.signals().dispatch_error(&err),
        }
    }
}

/// What a compiled body sees while rendering: output emission, nested
/// inclusion, and read access to the data context.
pub struct RenderScope<'a> {
    pub(crate) executor: &'a TemplateExecutor,
    pub(crate) unit: &'a TemplateUnit,
    pub(crate) data: &'a DataContext,
}

impl RenderScope<'_> {
    /// The data context bound to this execution.
    pub fn data(&self) -> &DataContext {
        self.data
    }

    /// Resolve a name from the data context.
    ///
    /// An undefined name is a runtime failure of the template body.
    pub fn lookup(&self, name: &str) -> TemplateResult<&Value> {
        self.data
            .get(name)
            .ok_or_else(|| TemplateError::Runtime(format!("undefined name in data context: {name}")))
    }

    /// Concatenate the fragments and append them to the unit's sink.
    ///
    /// Bytes become visible to the consumer immediately; call order is
    /// output order.
    pub fn echo<I>(&self, fragments: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut text = String::new();
        for fragment in fragments {
            text.push_str(fragment.as_ref());
        }
        if !text.is_empty() {
            self.unit.sink().write(Bytes::from(text));
        }
    }
}
