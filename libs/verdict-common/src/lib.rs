//! Shared types, queue semantics and configuration for the verdict
//! submission pipeline. The API and worker binaries both depend on this
//! crate so the wire format and Redis keys never drift apart.

pub mod config;
pub mod queue;
pub mod types;
