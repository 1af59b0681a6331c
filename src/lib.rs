//! RESTful resource adapter library.
//!
//! Exposes any [`Model`] implementation as an HTTP resource: a collection
//! at the mount path and one item per identifier below it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod routing;

pub use config::schema::{ResourceConfig, ServerConfig};
pub use http::{HttpServer, ResourceAdapter};
pub use lifecycle::Shutdown;
pub use model::{
    ItemSink, ItemStream, KeyValue, MemoryModel, Model, ModelError, ModelResult, Record,
};
