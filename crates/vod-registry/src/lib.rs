//! Playback link registry.
//!
//! The registry maps a job correlation identifier to its final playback
//! URL. Records are immutable once created: `create` conflicts on a
//! duplicate identifier and `get` is the only read.
//!
//! This crate provides:
//! - The `LinkStore` contract consumed by the façade
//! - An in-memory store backing it
//! - `RegistryClient`, the HTTP client workers use to report links

pub mod client;
pub mod error;
pub mod record;
pub mod store;

pub use client::RegistryClient;
pub use error::{RegistryError, RegistryResult};
pub use record::LinkRecord;
pub use store::{LinkStore, MemoryLinkStore};
