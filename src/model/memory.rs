//! In-memory model backend.
//!
//! # Design Decisions
//! - Records live in an `Arc<HashMap>` behind a lock. Writers copy on write
//!   when a reader still holds the previous map, so `get_all` can stream a
//!   consistent snapshot without blocking writers or materializing a list
//! - Lock sections never span an await point
//! - A stored empty value is a present record; only a missing key is absence

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::model::error::{ModelError, ModelResult};
use crate::model::stream::ItemStream;
use crate::model::Model;

/// A record that carries its own identifier.
pub trait Record: Clone + Send + Sync + 'static {
    /// The identifier this record is stored under.
    fn key(&self) -> &str;

    /// The same record stored under `key`.
    fn with_key(self, key: &str) -> Self;
}

type Records<T> = Arc<HashMap<String, T>>;

/// Thread-safe in-memory [`Model`].
pub struct MemoryModel<T> {
    records: Arc<RwLock<Records<T>>>,
}

impl<T> Clone for MemoryModel<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<T: Record> Default for MemoryModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MemoryModel<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Arc::new(HashMap::new()))),
        }
    }

    /// Create a store seeded with `records`, keyed by [`Record::key`].
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.key().to_string(), r))
            .collect();
        Self {
            records: Arc::new(RwLock::new(Arc::new(map))),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> ModelResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> ModelResult<bool> {
        Ok(self.len()? == 0)
    }

    /// A point-in-time copy of every record, keyed by identifier.
    pub fn snapshot(&self) -> ModelResult<HashMap<String, T>> {
        Ok(self.read()?.as_ref().clone())
    }

    fn read(&self) -> ModelResult<RwLockReadGuard<'_, Records<T>>> {
        self.records
            .read()
            .map_err(|_| ModelError::Unclassified("record lock poisoned".into()))
    }

    fn write(&self) -> ModelResult<RwLockWriteGuard<'_, Records<T>>> {
        self.records
            .write()
            .map_err(|_| ModelError::Unclassified("record lock poisoned".into()))
    }
}

fn require_key<T: Record>(record: &T) -> ModelResult<()> {
    if record.key().is_empty() {
        return Err(ModelError::TypeMismatch("record key must not be empty".into()));
    }
    Ok(())
}

#[async_trait]
impl<T> Model for MemoryModel<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    type Value = T;

    async fn get(&self, id: &str) -> ModelResult<Option<T>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn get_all(&self) -> ModelResult<ItemStream<T>> {
        let snapshot = Arc::clone(&*self.read()?);

        Ok(ItemStream::spawn(move |sink| async move {
            for record in snapshot.values() {
                if sink.send(record.clone()).await.is_err() {
                    tracing::trace!("Collection reader went away");
                    return;
                }
            }
        }))
    }

    async fn put(&self, id: &str, value: T) -> ModelResult<()> {
        let mut guard = self.write()?;
        if !guard.contains_key(id) {
            return Err(ModelError::NotFound(id.to_string()));
        }
        Arc::make_mut(&mut guard).insert(id.to_string(), value.with_key(id));
        Ok(())
    }

    async fn put_all(&self, values: Vec<T>) -> ModelResult<()> {
        for value in &values {
            require_key(value)?;
        }
        let replacement = values
            .into_iter()
            .map(|r| (r.key().to_string(), r))
            .collect();

        *self.write()? = Arc::new(replacement);
        Ok(())
    }

    async fn post(&self, value: T) -> ModelResult<String> {
        require_key(&value)?;
        let key = value.key().to_string();

        let mut guard = self.write()?;
        if guard.contains_key(&key) {
            return Err(ModelError::AlreadyExists(key));
        }
        Arc::make_mut(&mut guard).insert(key.clone(), value);
        Ok(key)
    }

    async fn delete(&self, id: &str) -> ModelResult<()> {
        let mut guard = self.write()?;
        if !guard.contains_key(id) {
            return Err(ModelError::NotFound(id.to_string()));
        }
        Arc::make_mut(&mut guard).remove(id);
        Ok(())
    }

    async fn delete_all(&self) -> ModelResult<()> {
        *self.write()? = Arc::new(HashMap::new());
        Ok(())
    }
}
