//! # Sorted Reply Dictionaries
//!
//! Reply bodies are JSON objects whose keys appear in strictly ascending
//! order. Consumers read fields in a single forward pass, so the order is
//! checked on both ends instead of being assumed:
//!
//! - [`SortedDictProducer`] refuses to append a key that does not sort after
//!   the previous one
//! - [`SortedDictConsumer`] rejects bodies with unsorted or repeated keys and
//!   refuses to read a key that sorts before one it already read
//!
//! Binary values are `0x`-prefixed lowercase hex strings; integers are
//! unsigned JSON numbers.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use shared_types::FixedBytes;
use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

use crate::domain::errors::ResponseRejection;

/// Reply body encoding and decoding failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Invalid reply body: {0}")]
    InvalidBody(String),

    #[error("Reply keys are not strictly sorted: '{key}' follows '{previous}'")]
    UnsortedKeys { previous: String, key: String },

    #[error("Key '{key}' read after '{previous}'")]
    OutOfOrder { previous: String, key: String },

    #[error("Missing field '{0}'")]
    MissingField(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<WireError> for ResponseRejection {
    fn from(err: WireError) -> Self {
        ResponseRejection::Malformed(err.to_string())
    }
}

/// Map entries in the order they were written or read.
struct OrderedEntries(Vec<(String, Value)>);

impl Serialize for OrderedEntries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a dictionary")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Builds a reply body one key at a time, in ascending key order.
#[derive(Debug, Default)]
pub struct SortedDictProducer {
    entries: Vec<(String, Value)>,
}

impl SortedDictProducer {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&mut self, key: &str, value: Value) -> Result<&mut Self, WireError> {
        if let Some((previous, _)) = self.entries.last() {
            if key <= previous.as_str() {
                return Err(WireError::UnsortedKeys {
                    previous: previous.clone(),
                    key: key.to_string(),
                });
            }
        }
        self.entries.push((key.to_string(), value));
        Ok(self)
    }

    pub fn append_bytes<T: FixedBytes>(&mut self, key: &str, value: &T) -> Result<&mut Self, WireError> {
        self.append(key, Value::String(value.to_hex()))
    }

    pub fn append_u64(&mut self, key: &str, value: u64) -> Result<&mut Self, WireError> {
        self.append(key, Value::from(value))
    }

    /// Serialized body.
    pub fn finish(self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(&OrderedEntries(self.entries))
            .map_err(|e| WireError::InvalidBody(e.to_string()))
    }
}

/// Reads a reply body in one forward pass.
///
/// Keys not asked for are skipped.
#[derive(Debug)]
pub struct SortedDictConsumer {
    entries: Peekable<IntoIter<(String, Value)>>,
    last_read: Option<String>,
}

impl SortedDictConsumer {
    /// Parse `body`, rejecting it unless its keys are strictly ascending.
    pub fn parse(body: &[u8]) -> Result<Self, WireError> {
        let OrderedEntries(entries) =
            serde_json::from_slice(body).map_err(|e| WireError::InvalidBody(e.to_string()))?;

        for pair in entries.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(WireError::UnsortedKeys {
                    previous: pair[0].0.clone(),
                    key: pair[1].0.clone(),
                });
            }
        }

        Ok(Self {
            entries: entries.into_iter().peekable(),
            last_read: None,
        })
    }

    fn require(&mut self, key: &str) -> Result<Value, WireError> {
        if let Some(previous) = &self.last_read {
            if key <= previous.as_str() {
                return Err(WireError::OutOfOrder {
                    previous: previous.clone(),
                    key: key.to_string(),
                });
            }
        }
        self.last_read = Some(key.to_string());

        while self.entries.next_if(|(k, _)| k.as_str() < key).is_some() {}

        self.entries
            .next_if(|(k, _)| k == key)
            .map(|(_, value)| value)
            .ok_or_else(|| WireError::MissingField(key.to_string()))
    }

    pub fn require_u64(&mut self, key: &str) -> Result<u64, WireError> {
        let value = self.require(key)?;
        value.as_u64().ok_or_else(|| WireError::InvalidValue {
            key: key.to_string(),
            reason: format!("expected an unsigned integer, got {value}"),
        })
    }

    pub fn require_bytes<T: FixedBytes>(&mut self, key: &str) -> Result<T, WireError> {
        let value = self.require(key)?;
        let invalid = |reason: String| WireError::InvalidValue {
            key: key.to_string(),
            reason,
        };

        let text = value
            .as_str()
            .ok_or_else(|| invalid(format!("expected a hex string, got {value}")))?;
        T::from_hex(text).map_err(|e| invalid(e.to_string()))
    }
}
