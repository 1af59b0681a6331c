//! Resource adapter: HTTP requests in, model operations out.
//!
//! # Data Flow
//! ```text
//! axum route ("/" or "/{key}")
//!     → routing::matcher (identifier or collection)
//!     → negotiate.rs (406 before anything else)
//!     → Operation::resolve (method × identifier → operation, else 405)
//!     → decode body (PUT / POST only, 400 on failure)
//!     → Model call under the gate
//!     → response.rs (status, literal or encoded body)
//! ```
//!
//! # Design Decisions
//! - The adapter holds no resource state; every request reaches the model
//! - Mutations take the gate exclusively, reads share it; bodies are read
//!   before the gate is taken and collections are streamed after it is
//!   released
//! - Failures are values (`AdapterError`), mapped to a response in one place

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{rejection::PathRejection, OriginalUri, Path, State},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::config::ResourceConfig;
use crate::http::negotiate::Negotiator;
use crate::http::request::RequestIdExt;
use crate::http::response::{self, AdapterError, COLLECTION_METHODS, ITEM_METHODS};
use crate::model::{Model, ModelError};
use crate::observability::metrics;
use crate::routing::matcher;

/// A model operation selected by method and identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Get(String),
    GetAll,
    Put(String),
    PutAll,
    Post,
    Delete(String),
    DeleteAll,
}

impl Operation {
    /// Look up the operation for `method` on an item (`Some`) or the
    /// collection (`None`).
    pub fn resolve(method: &Method, id: Option<String>) -> Result<Self, AdapterError> {
        let operation = match (method.as_str(), id) {
            ("GET", Some(id)) => Operation::Get(id),
            ("GET", None) => Operation::GetAll,
            ("PUT", Some(id)) => Operation::Put(id),
            ("PUT", None) => Operation::PutAll,
            ("POST", None) => Operation::Post,
            ("DELETE", Some(id)) => Operation::Delete(id),
            ("DELETE", None) => Operation::DeleteAll,
            (_, Some(_)) => return Err(AdapterError::MethodNotAllowed { allow: ITEM_METHODS }),
            (_, None) => {
                return Err(AdapterError::MethodNotAllowed {
                    allow: COLLECTION_METHODS,
                })
            }
        };
        Ok(operation)
    }

    /// Whether the operation changes backend state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Operation::Get(_) | Operation::GetAll)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Get(_) => "get",
            Operation::GetAll => "get_all",
            Operation::Put(_) => "put",
            Operation::PutAll => "put_all",
            Operation::Post => "post",
            Operation::Delete(_) => "delete",
            Operation::DeleteAll => "delete_all",
        }
    }
}

/// Exposes one [`Model`] as an HTTP resource.
///
/// Cheap to clone; clones share the model and the write gate.
pub struct ResourceAdapter<M: Model> {
    name: Arc<str>,
    model: Arc<M>,
    expiration: Duration,
    negotiator: Negotiator,
    gate: Arc<RwLock<()>>,
}

impl<M: Model> Clone for ResourceAdapter<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            model: self.model.clone(),
            expiration: self.expiration,
            negotiator: self.negotiator,
            gate: self.gate.clone(),
        }
    }
}

impl<M: Model> std::fmt::Debug for ResourceAdapter<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceAdapter")
            .field("name", &self.name)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

impl<M: Model> ResourceAdapter<M> {
    /// Create an adapter that owns `model`.
    pub fn new(name: impl Into<String>, model: M, expiration: Duration) -> Self {
        Self::shared(name, Arc::new(model), expiration)
    }

    /// Create an adapter over a model shared with other owners.
    pub fn shared(name: impl Into<String>, model: Arc<M>, expiration: Duration) -> Self {
        Self {
            name: Arc::from(name.into()),
            model,
            expiration,
            negotiator: Negotiator::json(),
            gate: Arc::new(RwLock::new(())),
        }
    }

    /// Create an adapter named and configured by a `[[resources]]` entry.
    pub fn from_config(config: &ResourceConfig, model: M) -> Self {
        Self::new(
            config.name.clone(),
            model,
            Duration::from_secs(config.expiration_secs),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// How long clients may cache successful reads.
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Axum router serving the collection at `/` and items at `/{key}`.
    pub fn router(self) -> Router {
        Router::new()
            .route("/", any(collection_handler::<M>))
            .route("/{key}", any(item_handler::<M>))
            .with_state(self)
    }

    /// Serve one request addressed to `id` (`None` for the collection).
    pub async fn handle(&self, id: Option<String>, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let request_id = request.request_id().to_string();

        let response = match self.dispatch(id, request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    AdapterError::Model(ModelError::Unclassified(detail)) => {
                        tracing::error!(
                            request_id = %request_id,
                            resource = %self.name,
                            method = %method,
                            error = %detail,
                            "Backend failure"
                        );
                    }
                    other => {
                        tracing::debug!(
                            request_id = %request_id,
                            resource = %self.name,
                            method = %method,
                            error = %other,
                            "Request rejected"
                        );
                    }
                }
                e.into_response()
            }
        };

        metrics::record_request(&self.name, method.as_str(), response.status().as_u16(), start);
        response
    }

    async fn dispatch(
        &self,
        id: Option<String>,
        request: Request<Body>,
    ) -> Result<Response, AdapterError> {
        if !self.negotiator.negotiate(request.headers()).is_accepted() {
            return Err(AdapterError::NotAcceptable);
        }

        let operation = Operation::resolve(request.method(), id)?;
        tracing::debug!(
            request_id = %request.request_id(),
            resource = %self.name,
            operation = operation.name(),
            "Dispatching"
        );

        let collection_path = request
            .extensions()
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());
        let body = request.into_body();
        let cache = response::cache_control(self.expiration);

        match operation {
            Operation::Get(id) => {
                let found = {
                    let _read = self.gate.read().await;
                    self.model.get(&id).await?
                };
                match found {
                    Some(value) => response::json_value(&value, cache),
                    None => Err(ModelError::NotFound(id).into()),
                }
            }
            Operation::GetAll => {
                let items = {
                    let _read = self.gate.read().await;
                    self.model.get_all().await?
                };
                response::json_collection(items, cache, self.name.clone()).await
            }
            Operation::Put(id) => {
                let value: M::Value = decode(body).await?;
                let _write = self.gate.write().await;
                self.model.put(&id, value).await?;
                Ok(response::ack())
            }
            Operation::PutAll => {
                let values: Vec<M::Value> = decode(body).await?;
                let _write = self.gate.write().await;
                self.model.put_all(values).await?;
                Ok(response::ack())
            }
            Operation::Post => {
                let value: M::Value = decode(body).await?;
                let id = {
                    let _write = self.gate.write().await;
                    self.model.post(value).await?
                };
                tracing::info!(resource = %self.name, key = %id, "Resource created");
                let location = matcher::item_path(&collection_path, &id);
                Ok(response::created(&id, Some(&location)))
            }
            Operation::Delete(id) => {
                let _write = self.gate.write().await;
                self.model.delete(&id).await?;
                Ok(response::ack())
            }
            Operation::DeleteAll => {
                let _write = self.gate.write().await;
                self.model.delete_all().await?;
                Ok(response::ack())
            }
        }
    }
}

/// Read the whole body and decode it as `T`.
async fn decode<T: DeserializeOwned>(body: Body) -> Result<T, AdapterError> {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(read_error)?;
    serde_json::from_slice(&bytes).map_err(|e| AdapterError::Decode(e.to_string()))
}

/// A body that hit the size limit mid-read is 413; anything else is 400.
fn read_error(err: axum::Error) -> AdapterError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return AdapterError::PayloadTooLarge;
        }
        source = e.source();
    }
    AdapterError::Decode(err.to_string())
}

async fn collection_handler<M: Model>(
    State(adapter): State<ResourceAdapter<M>>,
    request: Request<Body>,
) -> Response {
    adapter.handle(None, request).await
}

async fn item_handler<M: Model>(
    State(adapter): State<ResourceAdapter<M>>,
    key: Result<Path<String>, PathRejection>,
    request: Request<Body>,
) -> Response {
    let captured = match key {
        Ok(Path(key)) => matcher::capture_identifier(&key).map_err(|e| e.to_string()),
        Err(rejection) => Err(rejection.body_text()),
    };
    match captured {
        Ok(id) => adapter.handle(id, request).await,
        Err(reason) => {
            tracing::debug!(resource = %adapter.name(), error = %reason, "Identifier rejected");
            (StatusCode::NOT_FOUND, "No matching resource").into_response()
        }
    }
}
