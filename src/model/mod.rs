//! Backend storage contract.
//!
//! # Data Flow
//! ```text
//! ResourceAdapter
//!     → Model (get / get_all / put / put_all / post / delete / delete_all)
//!     → concrete backend (memory.rs, or any user implementation)
//!
//! get_all:
//!     backend spawns producer task
//!     → stream.rs (bounded handoff, one item at a time)
//!     → adapter encodes each item as it arrives
//! ```
//!
//! # Design Decisions
//! - One concrete value type per model (`Model::Value`), so payload shape is
//!   checked at compile time everywhere except the decode boundary
//! - Absence is `Ok(None)`, never an error
//! - Errors are a closed taxonomy (error.rs) so the adapter can map them to
//!   status codes deterministically

pub mod error;
pub mod key_value;
pub mod memory;
pub mod stream;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

pub use error::{ModelError, ModelResult};
pub use key_value::KeyValue;
pub use memory::{MemoryModel, Record};
pub use stream::{ItemSink, ItemStream, StreamClosed};

/// Storage contract a backend implements to be exposed as an HTTP resource.
///
/// Implementations must be safe to call from many requests at once. The
/// adapter serializes mutating calls against one another, but a backend
/// shared between several adapters must still guard its own state.
#[async_trait]
pub trait Model: Send + Sync + 'static {
    /// The record type stored under each identifier.
    type Value: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Fetch one record. `Ok(None)` means the identifier is unknown.
    async fn get(&self, id: &str) -> ModelResult<Option<Self::Value>>;

    /// Start a lazy, single-pass read of the whole collection.
    ///
    /// Ordering is backend-defined and may differ between calls.
    async fn get_all(&self) -> ModelResult<ItemStream<Self::Value>>;

    /// Replace an existing record. Fails with `NotFound` if `id` is unknown.
    async fn put(&self, id: &str, value: Self::Value) -> ModelResult<()>;

    /// Replace the entire collection with `values`.
    async fn put_all(&self, values: Vec<Self::Value>) -> ModelResult<()>;

    /// Create a record, returning the identifier derived from it.
    async fn post(&self, value: Self::Value) -> ModelResult<String>;

    /// Remove one record. Fails with `NotFound` if `id` is unknown.
    async fn delete(&self, id: &str) -> ModelResult<()>;

    /// Remove every record.
    async fn delete_all(&self) -> ModelResult<()>;
}
