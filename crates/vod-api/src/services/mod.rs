//! Background services.

pub mod poller;

pub use poller::{PipelineConfig, QueuePoller};
