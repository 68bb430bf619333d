//! SQS work queue gateway.
//!
//! This crate provides:
//! - Long-poll message receive (an empty batch is a timeout, not an error)
//! - Message deletion by receipt handle
//!
//! The queue itself is an external durable system; delivery guarantees
//! come from its visibility window, not from anything in this crate.

pub mod error;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{QueueConfig, ReceivedMessage, UploadQueue};
