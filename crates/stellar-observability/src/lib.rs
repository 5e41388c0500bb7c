//! Logging infrastructure for Stellar.
//!
//! This crate provides:
//! - `LogOptions` - The logging configuration every render environment carries
//! - `LogEntry` - Structured log records (JSON or human-readable)
//! - `LogDestination` - Stderr, `tracing` forwarding, or in-memory capture
//! - `LogTarget` - Destination names accepted in config files

mod logging;

pub use logging::*;
