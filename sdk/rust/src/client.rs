use std::marker::PhantomData;

use reqwest::{header, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Status code the server answered with, if it answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::Decode(_) => None,
        }
    }
}

/// Client for one resource collection, e.g. `http://localhost:8080/kv`.
pub struct ResourceClient<T> {
    client: Client,
    collection_url: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            collection_url: self.collection_url.clone(),
            _value: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> ResourceClient<T> {
    pub fn new(collection_url: &str) -> Self {
        Self::with_client(Client::new(), collection_url)
    }

    /// Reuse an existing connection pool.
    pub fn with_client(client: Client, collection_url: &str) -> Self {
        Self {
            client,
            collection_url: collection_url.trim_end_matches('/').to_string(),
            _value: PhantomData,
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// URL of the item stored under `id`.
    pub fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    /// Fetch one item. `None` when the server has no item under `id`.
    pub async fn get(&self, id: &str) -> Result<Option<T>, ClientError> {
        let resp = self
            .client
            .get(self.item_url(id))
            .header(header::ACCEPT, APPLICATION_JSON)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = success(resp).await?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Fetch the whole collection.
    pub async fn list(&self) -> Result<Vec<T>, ClientError> {
        let resp = self
            .client
            .get(&self.collection_url)
            .header(header::ACCEPT, APPLICATION_JSON)
            .send()
            .await?;
        let text = success(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Replace the item stored under `id`.
    pub async fn put(&self, id: &str, value: &T) -> Result<(), ClientError> {
        let resp = self.client.put(self.item_url(id)).json(value).send().await?;
        success(resp).await.map(drop)
    }

    /// Replace the whole collection.
    pub async fn replace_all(&self, values: &[T]) -> Result<(), ClientError> {
        let resp = self.client.put(&self.collection_url).json(values).send().await?;
        success(resp).await.map(drop)
    }

    /// Create a new item, returning the identifier the server assigned.
    pub async fn post(&self, value: &T) -> Result<String, ClientError> {
        let resp = self.client.post(&self.collection_url).json(value).send().await?;
        success(resp).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let resp = self.client.delete(self.item_url(id)).send().await?;
        success(resp).await.map(drop)
    }

    pub async fn delete_all(&self) -> Result<(), ClientError> {
        let resp = self.client.delete(&self.collection_url).send().await?;
        success(resp).await.map(drop)
    }
}

/// Body text of a 2xx response, or the status and body as an error.
async fn success(resp: Response) -> Result<String, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ClientError::Status { status, body })
    }
}
