//! Pipeline Module
//!
//! Matches pipelined replies to the commands that produced them.
//!
//! ## Responsibilities
//! - Keep one expectation per in-flight command, strictly FIFO
//! - Track the single fetch whose payload is being read
//! - Route framed replies to the right completion, exactly once

mod queue;
mod dispatcher;

pub use queue::{BulkFrame, Completion, Expectation, PipelineQueue};
pub use dispatcher::Dispatcher;
