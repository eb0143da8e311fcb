//! Compiler adapter boundary
//!
//! The template language itself lives behind these traits. A
//! [`TemplateCompiler`] turns raw source text into an executable
//! [`CompiledTemplate`]; the executable form renders against a
//! [`RenderScope`], which provides `echo`, `include`, and data-context
//! lookup. Compilation is synchronous and never retried.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::TemplateResult;
use crate::orchestration::RenderScope;

pub mod passthrough;

pub use passthrough::PassthroughCompiler;

/// Turns raw template source into an executable form.
pub trait TemplateCompiler: Send + Sync {
    /// Compile the given source text.
    ///
    /// Fails with `TemplateError::Compile` carrying the source location
    /// when the engine reports one.
    fn compile(&self, source: &str) -> TemplateResult<Arc<dyn CompiledTemplate>>;
}

/// The executable representation of one compiled template.
#[async_trait]
pub trait CompiledTemplate: Send + Sync {
    /// Run the body, emitting output and nested inclusions through the
    /// scope. An error here is a runtime failure of the template itself.
    async fn render(&self, scope: &RenderScope<'_>) -> TemplateResult<()>;
}
