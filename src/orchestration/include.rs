//! Nested template inclusion
//!
//! An include splices a child template's output into the parent's stream
//! at the point of invocation. The parent resumes only after the child
//! has signaled exactly one of `complete` or `error`; a failed child is
//! forwarded to the parent's `error` signal and the parent's own body
//! keeps going, so one bad inclusion never stalls the output stream.

use crate::core::{DataContext, TemplateUnit};

use super::executor::RenderScope;

impl RenderScope<'_> {
    /// Execute a child template and splice its output in at this point.
    ///
    /// The child resolves against the same root and writes to the same
    /// sink as the parent; identifiers with a trailing separator get the
    /// configured default document appended. This call suspends the
    /// parent's body until the child finishes or fails, which keeps
    /// sibling includes strictly in invocation order.
    pub async fn include(&self, identifier: &str, data: &DataContext) {
        let mut child = TemplateUnit::for_identifier(
            identifier,
            self.unit.settings().clone(),
            self.unit.sink().clone(),
        );

        // Forward the child's failure to the parent, then keep rendering.
        let parent_signals = self.unit.signals().clone();
        child.signals().on_error(move |err| {
            parent_signals.dispatch_error(err);
        });

        // The executor dispatches exactly one terminal signal before this
        // future resolves; resuming here is the parent's continuation.
        self.executor.execute(&mut child, data).await;
    }
}
