//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned and echoed)
//!     → routing (mount path → resource, segment → identifier)
//!     → adapter.rs (negotiate.rs, operation, model call)
//!     → response.rs (status, headers, literal or streamed body)
//!     → Send to client
//! ```

pub mod adapter;
pub mod negotiate;
pub mod request;
pub mod response;
pub mod server;

pub use adapter::{Operation, ResourceAdapter};
pub use negotiate::{Negotiation, Negotiator, APPLICATION_JSON};
pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::AdapterError;
pub use server::HttpServer;
