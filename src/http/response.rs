//! Response assembly.
//!
//! # Responsibilities
//! - Map adapter and model failures to status codes
//! - Build the fixed-literal bodies (`OK`, new identifier, `[]`)
//! - Encode single values and stream encoded collections
//! - Attach cache metadata to successful reads
//!
//! # Design Decisions
//! - The collection status is decided by the first item: a producer error
//!   before any item is a 500, after that the body stream fails so the
//!   client sees a truncated transfer instead of a well-formed wrong array
//! - Dropping the body drops the `ItemStream`, which stops its producer

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::stream;
use serde::Serialize;
use thiserror::Error;

use crate::http::negotiate::APPLICATION_JSON;
use crate::model::{ItemStream, ModelError};
use crate::observability::metrics;

/// Body of every successful PUT and DELETE.
pub const ACK_BODY: &str = "OK";

/// Body of a collection read with no items.
pub const EMPTY_COLLECTION: &str = "[]";

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Methods valid on an item path.
pub const ITEM_METHODS: &str = "GET, PUT, DELETE";

/// Methods valid on a collection path.
pub const COLLECTION_METHODS: &str = "GET, PUT, POST, DELETE";

/// Every way a request can fail at the adapter boundary.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The client does not accept the adapter's representation.
    #[error("Not acceptable")]
    NotAcceptable,

    /// The request body could not be read or decoded.
    #[error("Malformed request body: {0}")]
    Decode(String),

    /// The request body grew past the configured limit while being read.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// No operation exists for this method on this path.
    #[error("Method not allowed")]
    MethodNotAllowed { allow: &'static str },

    /// The model rejected the operation.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl AdapterError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdapterError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            AdapterError::Decode(_) => StatusCode::BAD_REQUEST,
            AdapterError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AdapterError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AdapterError::Model(e) => status_for(e),
        }
    }
}

/// Status code for a model failure.
pub fn status_for(err: &ModelError) -> StatusCode {
    match err {
        ModelError::NotFound(_) => StatusCode::NOT_FOUND,
        ModelError::TypeMismatch(_) => StatusCode::BAD_REQUEST,
        ModelError::AlreadyExists(_) => StatusCode::CONFLICT,
        ModelError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        let status = self.status();
        let content_type = [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))];

        match self {
            AdapterError::MethodNotAllowed { allow } => (
                status,
                content_type,
                [(header::ALLOW, HeaderValue::from_static(allow))],
                "Method not allowed",
            )
                .into_response(),
            // Backend detail stays in the logs
            AdapterError::Model(ModelError::Unclassified(_)) => {
                (status, content_type, "Internal server error").into_response()
            }
            other => (status, content_type, other.to_string()).into_response(),
        }
    }
}

/// `Cache-Control` value advertising `expiration`.
pub fn cache_control(expiration: Duration) -> HeaderValue {
    if expiration.is_zero() {
        return HeaderValue::from_static("no-cache");
    }
    HeaderValue::from_str(&format!("max-age={}", expiration.as_secs()))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}

/// 200 with the acknowledgment literal.
pub fn ack() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
        ACK_BODY,
    )
        .into_response()
}

/// 200 with the new identifier as a plain-text body.
pub fn created(id: &str, location: Option<&str>) -> Response {
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
        id.to_string(),
    )
        .into_response();

    if let Some(value) = location.and_then(|l| HeaderValue::from_str(l).ok()) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

fn json(body: Body, cache: HeaderValue) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)),
            (header::CACHE_CONTROL, cache),
        ],
        body,
    )
        .into_response()
}

/// 200 with one encoded value.
pub fn json_value<T: Serialize>(value: &T, cache: HeaderValue) -> Result<Response, AdapterError> {
    let encoded = serde_json::to_vec(value)
        .map_err(|e| ModelError::Unclassified(format!("failed to encode value: {e}")))?;
    Ok(json(Body::from(encoded), cache))
}

enum Phase<T> {
    Open { items: ItemStream<T>, first: T },
    Next(ItemStream<T>),
    Done,
}

type Chunk = Result<Bytes, std::io::Error>;

fn encode_chunk<T: Serialize>(separator: u8, item: &T) -> Chunk {
    let mut buf = vec![separator];
    serde_json::to_writer(&mut buf, item)?;
    Ok(Bytes::from(buf))
}

fn advance<T>(chunk: Chunk, items: ItemStream<T>) -> Option<(Chunk, Phase<T>)> {
    let next = if chunk.is_ok() { Phase::Next(items) } else { Phase::Done };
    Some((chunk, next))
}

/// 200 with the collection encoded as a JSON array, item by item.
///
/// Waits for the first item before committing to a status.
pub async fn json_collection<T>(
    mut items: ItemStream<T>,
    cache: HeaderValue,
    resource: Arc<str>,
) -> Result<Response, AdapterError>
where
    T: Serialize + Send + 'static,
{
    let first = match items.next_item().await {
        None => return Ok(json(Body::from(EMPTY_COLLECTION), cache)),
        Some(Err(e)) => return Err(e.into()),
        Some(Ok(first)) => first,
    };

    let chunks = stream::unfold(Phase::Open { items, first }, move |phase| {
        let resource = resource.clone();
        async move {
            match phase {
                Phase::Open { items, first } => {
                    metrics::record_stream_item(&resource);
                    advance(encode_chunk(b'[', &first), items)
                }
                Phase::Next(mut items) => match items.next_item().await {
                    Some(Ok(item)) => {
                        metrics::record_stream_item(&resource);
                        advance(encode_chunk(b',', &item), items)
                    }
                    Some(Err(e)) => {
                        tracing::warn!(
                            resource = %resource,
                            error = %e,
                            "Collection stream failed, truncating response"
                        );
                        Some((Err(std::io::Error::other(e)), Phase::Done))
                    }
                    None => Some((Ok(Bytes::from_static(b"]")), Phase::Done)),
                },
                Phase::Done => None,
            }
        }
    });

    Ok(json(Body::from_stream(chunks), cache))
}
