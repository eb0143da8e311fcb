//! Verbatim template engine
//!
//! The default engine for the binary: the compiled form of a source file
//! is the source itself, emitted unchanged. Real template languages plug
//! in through the same traits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::TemplateResult;
use crate::orchestration::RenderScope;

use super::{CompiledTemplate, TemplateCompiler};

/// Engine whose compiled output is the source text, unmodified.
#[derive(Default)]
pub struct PassthroughCompiler;

impl TemplateCompiler for PassthroughCompiler {
    fn compile(&self, source: &str) -> TemplateResult<Arc<dyn CompiledTemplate>> {
        Ok(Arc::new(PassthroughTemplate {
            body: source.to_string(),
        }))
    }
}

struct PassthroughTemplate {
    body: String,
}

#[async_trait]
impl CompiledTemplate for PassthroughTemplate {
    async fn render(&self, scope: &RenderScope<'_>) -> TemplateResult<()> {
        scope.echo([self.body.as_str()]);
        Ok(())
    }
}
