//! Service layer
//!
//! Maps inbound HTTP requests onto template executions and streams the
//! produced output back as the response body.

pub mod http;

pub use http::{build_router, TemplateService};
