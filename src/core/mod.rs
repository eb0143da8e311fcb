//! Core abstractions for templix
//!
//! This module provides the template unit, the signal protocol, and the
//! error types shared by the loader, engine, and executor layers.

use std::collections::HashMap;

use serde_json::Value;

pub mod error;
pub mod signal;
pub mod unit;

// Re-export commonly used types
pub use error::{ErrorContext, TemplateError, TemplateResult};
pub use signal::{ExecStarted, Signals};
pub use unit::{SourceMetadata, TemplateUnit};

/// The name-to-value mapping visible to a template body during execution.
///
/// Supplied per execution; not part of a unit's identity.
pub type DataContext = HashMap<String, Value>;
