//! Toolforge Core Types
//!
//! Identifiers and wall-clock timestamps shared by the schema, dispatcher
//! and server crates. This crate performs no I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod id;
pub mod time;

// Re-exports
pub use id::ExecutionId;
pub use time::Timestamp;
