//! Key/value record used by the demo server and the tests.

use serde::{Deserialize, Serialize};

use crate::model::memory::Record;

/// A string value stored under a string key.
///
/// `Key` may be omitted from request bodies; PUT takes the key from the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(rename = "Key", default)]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Record for KeyValue {
    fn key(&self) -> &str {
        &self.key
    }

    fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }
}
