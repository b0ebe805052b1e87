//! Tool handlers and the validating execution dispatcher.
//!
//! A [`ToolDefinition`] pairs a [`ToolHandler`] with input and config
//! schemas. The [`Dispatcher`] validates every request against those
//! schemas before the handler sees it, and turns every outcome (success,
//! validation failure, handler error, panic, timeout) into a
//! [`ResponseEnvelope`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod definition;
pub mod dispatch;
pub mod envelope;
pub mod trait_;

pub use context::{ExecutionContext, RequestContext};
pub use definition::ToolDefinition;
pub use dispatch::{Dispatcher, merge_config};
pub use envelope::{ExecutionRequest, ExecutionStatus, ResponseEnvelope, codes};
pub use trait_::{FnHandler, ToolError, ToolHandler, handler_fn};
