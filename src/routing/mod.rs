//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (mount table: which resource owns the prefix)
//!     → axum route "/" or "/{key}" inside that resource
//!     → matcher.rs (captured segment → identifier or collection)
//!     → Return: ResourceAdapter::handle, or 404
//!
//! Route Compilation (at startup):
//!     ResourceConfig[]
//!     → normalize mount paths
//!     → reject duplicates
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Identifier rules enforced once, before the adapter sees a request

pub mod matcher;
pub mod router;

pub use matcher::{capture_identifier, normalize_mount_path};
pub use router::{MountedResource, ResourceRoutes, RouteError};
