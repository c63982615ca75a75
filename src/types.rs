//! Core types shared by the receive stage.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Event time in milliseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Timestamp(pub i64);

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// 128-bit digest of a primary-side value.
///
/// Carried inside subscription wrappers so the response stage can tell
/// whether a foreign-key response still matches the current primary value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueHash(pub [u8; 16]);

impl ValueHash {
    /// Length of the digest in bytes.
    pub const LEN: usize = 16;

    /// Compute hash from serialized value bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let digest = hasher.finalize();
        let mut out = [0u8; Self::LEN];
        out.copy_from_slice(&digest[..Self::LEN]);
        ValueHash(out)
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; Self::LEN] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(ValueHash(arr))
    }
}

impl fmt::Debug for ValueHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueHash({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for ValueHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Identity of a processing task: one subtopology applied to one partition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId {
    pub subtopology: u32,
    pub partition: i32,
}

impl TaskId {
    pub fn new(subtopology: u32, partition: i32) -> Self {
        Self {
            subtopology,
            partition,
        }
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({}_{})", self.subtopology, self.partition)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.subtopology, self.partition)
    }
}

/// Where an input record came from.
///
/// Synthetic records (punctuations, tests) have no origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// A keyed record flowing between processors.
#[derive(Clone, Debug, PartialEq)]
pub struct Record<K, V> {
    /// Record key. Absent keys are legal on the wire and handled per processor.
    pub key: Option<K>,
    pub value: V,
    pub timestamp: Timestamp,
    /// Origin of the record, when known.
    pub metadata: Option<RecordMetadata>,
}

impl<K, V> Record<K, V> {
    pub fn new(key: Option<K>, value: V, timestamp: Timestamp) -> Self {
        Self {
            key,
            value,
            timestamp,
            metadata: None,
        }
    }

    /// Attach origin metadata.
    pub fn with_metadata(mut self, metadata: RecordMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Replace the key, keeping value, timestamp and origin.
    pub fn with_key<K2>(self, key: K2) -> Record<K2, V> {
        Record {
            key: Some(key),
            value: self.value,
            timestamp: self.timestamp,
            metadata: self.metadata,
        }
    }

    /// Replace the value, keeping key, timestamp and origin.
    pub fn with_value<V2>(self, value: V2) -> Record<K, V2> {
        Record {
            key: self.key,
            value,
            timestamp: self.timestamp,
            metadata: self.metadata,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// A value together with the event time it became effective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueAndTimestamp<V> {
    pub value: V,
    pub timestamp: Timestamp,
}

impl<V> ValueAndTimestamp<V> {
    pub fn make(value: V, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }
}

/// Before/after pair for one key at one point in event time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<V> {
    pub new_value: Option<V>,
    pub old_value: Option<V>,
}

impl<V> Change<V> {
    pub fn new(new_value: Option<V>, old_value: Option<V>) -> Self {
        Self {
            new_value,
            old_value,
        }
    }

    /// Neither side carries a value.
    pub fn is_empty(&self) -> bool {
        self.new_value.is_none() && self.old_value.is_none()
    }
}
