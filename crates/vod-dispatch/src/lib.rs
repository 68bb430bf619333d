//! ECS task dispatcher for transcode workers.
//!
//! One `dispatch` call launches one isolated Fargate task with the job
//! parameters injected through the container environment. The dispatcher
//! never waits for the worker and never retries a failed launch — the
//! caller decides what a failure means.

pub mod dispatcher;
pub mod error;

pub use dispatcher::{DispatchConfig, EcsDispatcher, TaskHandle};
pub use error::{DispatchError, DispatchResult};
