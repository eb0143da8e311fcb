//! Template execution orchestration
//!
//! This layer coordinates the template lifecycle: resolving or reusing a
//! compiled form, running the body against a data context, and signaling
//! completion or error, including nested inclusion of child templates.

pub mod executor;
pub mod include;


pub use executor::{RenderScope, TemplateExecutor};
