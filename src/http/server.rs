//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Collect resource routers into one Axum application
//! - Wire up middleware (tracing, limits, timeouts, request ID)
//! - Bind server to listener and serve until shutdown
//!
//! # Design Decisions
//! - Layers are applied once, around every mounted resource
//! - Request ID is the outermost layer so every log line carries it
//! - Shutdown is a broadcast receiver, so the caller owns the trigger

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::adapter::ResourceAdapter;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::model::Model;
use crate::routing::{MountedResource, ResourceRoutes, RouteError};

/// HTTP server exposing one or more resources.
#[derive(Debug)]
pub struct HttpServer {
    routes: ResourceRoutes,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server with no resources mounted yet.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            routes: ResourceRoutes::new(),
            config,
        }
    }

    /// Serve `adapter` under `path`.
    pub fn mount<M: Model>(
        &mut self,
        path: &str,
        adapter: ResourceAdapter<M>,
    ) -> Result<(), RouteError> {
        self.routes.mount(path, adapter)
    }

    pub fn mounted(&self) -> &[MountedResource] {
        self.routes.mounted()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn into_router(self) -> Router {
        let config = &self.config;
        self.routes
            .into_router()
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            resources = self.routes.mounted().len(),
            "HTTP server starting"
        );

        let app = self.into_router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::X_REQUEST_ID;
    use crate::model::{KeyValue, MemoryModel};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server(config: ServerConfig) -> HttpServer {
        let mut server = HttpServer::new(config);
        server
            .mount(
                "/kv",
                ResourceAdapter::new(
                    "kv",
                    MemoryModel::with_records([KeyValue::new("Peter", "Lemon")]),
                    Duration::from_secs(5),
                ),
            )
            .unwrap();
        server
    }

    #[tokio::test]
    async fn test_assigns_and_keeps_request_ids() {
        let router = server(ServerConfig::default()).into_router();

        let response = router
            .clone()
            .oneshot(Request::get("/kv/Peter").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let response = router
            .oneshot(
                Request::get("/kv/Peter")
                    .header(X_REQUEST_ID, "client-chosen")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "client-chosen");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let router = server(ServerConfig::default()).into_router();
        let response = router
            .oneshot(Request::get("/elsewhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"No matching resource");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut config = ServerConfig::default();
        config.limits.max_body_size = 16;
        let router = server(config).into_router();

        let body = r#"{"Key":"Paul","Value":"a value much longer than sixteen bytes"}"#;
        let response = router
            .oneshot(
                Request::post("/kv")
                    .header("content-length", body.len())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_body_limit_without_declared_length() {
        let mut config = ServerConfig::default();
        config.limits.max_body_size = 16;
        let router = server(config).into_router();

        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![
            Ok(r#"{"Key":"Paul","#),
            Ok(r#""Value":"a value much longer than sixteen bytes"}"#),
        ];
        let response = router
            .clone()
            .oneshot(
                Request::post("/kv")
                    .body(Body::from_stream(futures_util::stream::iter(chunks)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = router
            .oneshot(Request::get("/kv/Paul").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
