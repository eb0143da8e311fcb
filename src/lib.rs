//! This crate contains the core logic of the templix template server.
//!
//! It loads template source files asynchronously, compiles them through a
//! pluggable engine, executes them against a data context, and streams
//! the produced output incrementally, with nested includes spliced into
//! the parent's output stream.

pub mod config;
pub mod core;
pub mod engine;
pub mod loader;
pub mod orchestration;
pub mod service;
pub mod sink;
