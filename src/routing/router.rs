//! Resource mount table.
//!
//! # Responsibilities
//! - Mount each adapter's router at its configured path
//! - Reject conflicting mounts
//! - Produce one axum `Router` for the server
//!
//! # Design Decisions
//! - Immutable after the server starts
//! - The root mount is merged, every other mount is nested under its path
//! - Unmatched paths fall through to a plain 404

use axum::{http::StatusCode, response::IntoResponse, Router};
use thiserror::Error;

use crate::http::adapter::ResourceAdapter;
use crate::model::Model;
use crate::routing::matcher::{normalize_mount_path, InvalidMountPath};

/// Why a resource could not be mounted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error(transparent)]
    InvalidPath(#[from] InvalidMountPath),

    #[error("path {path:?} is already serving resource {existing:?}")]
    DuplicatePath { path: String, existing: String },
}

/// A resource that has been mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedResource {
    pub name: String,
    pub path: String,
}

/// Collects resource routers into one application router.
#[derive(Debug, Default)]
pub struct ResourceRoutes {
    router: Router,
    mounted: Vec<MountedResource>,
}

impl ResourceRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `adapter` at `path`.
    pub fn mount<M: Model>(
        &mut self,
        path: &str,
        adapter: ResourceAdapter<M>,
    ) -> Result<(), RouteError> {
        let path = normalize_mount_path(path)?;
        if let Some(existing) = self.mounted.iter().find(|m| m.path == path) {
            return Err(RouteError::DuplicatePath {
                path,
                existing: existing.name.clone(),
            });
        }

        let name = adapter.name().to_string();
        let resource_router = adapter.router();
        let router = std::mem::take(&mut self.router);
        self.router = if path == "/" {
            router.merge(resource_router)
        } else {
            router.nest(&path, resource_router)
        };

        tracing::info!(resource = %name, path = %path, "Resource mounted");
        self.mounted.push(MountedResource { name, path });
        Ok(())
    }

    /// Resources mounted so far, in mount order.
    pub fn mounted(&self) -> &[MountedResource] {
        &self.mounted
    }

    /// The combined router, with a 404 fallback for unmatched paths.
    pub fn into_router(self) -> Router {
        self.router.fallback(no_route)
    }
}

async fn no_route() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "No matching resource")
}
