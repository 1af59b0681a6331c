//! Typed HTTP client for resources served by `rest-resource`.

mod client;

pub use client::{ClientError, ResourceClient};
