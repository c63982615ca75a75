//! Byte codec for combined keys.

use crate::codec::KeyCodec;
use crate::error::{JoinError, Result};
use crate::processor::StreamsContext;
use std::sync::Arc;

use super::CombinedKey;

/// Size of the foreign-key length prefix.
const LENGTH_PREFIX_SIZE: usize = 4;

/// Topic names the key codecs are invoked with, resolved at init.
#[derive(Clone, Debug)]
struct SerdeTopics {
    foreign_key: String,
    primary_key: String,
}

/// Encodes and decodes `(foreign key, primary key)` pairs.
///
/// The serde topic names are only known once the application id is, so the
/// schema must be bound with [`CombinedKeySchema::init`] before use.
pub struct CombinedKeySchema<FK, PK> {
    foreign_key_topic_suffix: String,
    primary_key_topic_suffix: String,
    foreign_key_codec: Arc<dyn KeyCodec<FK>>,
    primary_key_codec: Arc<dyn KeyCodec<PK>>,
    topics: Option<SerdeTopics>,
}

impl<FK, PK> Clone for CombinedKeySchema<FK, PK> {
    fn clone(&self) -> Self {
        Self {
            foreign_key_topic_suffix: self.foreign_key_topic_suffix.clone(),
            primary_key_topic_suffix: self.primary_key_topic_suffix.clone(),
            foreign_key_codec: Arc::clone(&self.foreign_key_codec),
            primary_key_codec: Arc::clone(&self.primary_key_codec),
            topics: self.topics.clone(),
        }
    }
}

impl<FK, PK> CombinedKeySchema<FK, PK> {
    pub fn new(
        foreign_key_topic_suffix: impl Into<String>,
        foreign_key_codec: Arc<dyn KeyCodec<FK>>,
        primary_key_topic_suffix: impl Into<String>,
        primary_key_codec: Arc<dyn KeyCodec<PK>>,
    ) -> Self {
        Self {
            foreign_key_topic_suffix: foreign_key_topic_suffix.into(),
            primary_key_topic_suffix: primary_key_topic_suffix.into(),
            foreign_key_codec,
            primary_key_codec,
            topics: None,
        }
    }

    /// Bind serde topic names from the processing context.
    pub fn init(&mut self, context: &dyn StreamsContext) -> Result<()> {
        let application_id = context.application_id();
        if application_id.is_empty() {
            return Err(JoinError::InvalidConfig(
                "application id must not be empty".into(),
            ));
        }

        self.topics = Some(SerdeTopics {
            foreign_key: format!("{}-{}", application_id, self.foreign_key_topic_suffix),
            primary_key: format!("{}-{}", application_id, self.primary_key_topic_suffix),
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.topics.is_some()
    }

    fn topics(&self) -> Result<&SerdeTopics> {
        self.topics.as_ref().ok_or(JoinError::SchemaNotInitialized)
    }

    /// Encode a combined key.
    pub fn to_bytes(&self, foreign_key: &FK, primary_key: &PK) -> Result<Vec<u8>> {
        let topics = self.topics()?;
        let fk_bytes = self
            .foreign_key_codec
            .serialize(&topics.foreign_key, foreign_key)?;
        let pk_bytes = self
            .primary_key_codec
            .serialize(&topics.primary_key, primary_key)?;

        let mut out = Vec::with_capacity(LENGTH_PREFIX_SIZE + fk_bytes.len() + pk_bytes.len());
        write_prefix(&mut out, &fk_bytes)?;
        out.extend_from_slice(&pk_bytes);
        Ok(out)
    }

    /// Decode a combined key produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<CombinedKey<FK, PK>> {
        let topics = self.topics()?;

        if bytes.len() < LENGTH_PREFIX_SIZE {
            return Err(JoinError::InvalidFormat(format!(
                "combined key too short: {} bytes",
                bytes.len()
            )));
        }

        let mut len_bytes = [0u8; LENGTH_PREFIX_SIZE];
        len_bytes.copy_from_slice(&bytes[..LENGTH_PREFIX_SIZE]);
        let fk_len = u32::from_be_bytes(len_bytes) as usize;

        let fk_end = LENGTH_PREFIX_SIZE
            .checked_add(fk_len)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| {
                JoinError::InvalidFormat(format!(
                    "foreign key length {} exceeds combined key of {} bytes",
                    fk_len,
                    bytes.len()
                ))
            })?;

        let foreign_key = self
            .foreign_key_codec
            .deserialize(&topics.foreign_key, &bytes[LENGTH_PREFIX_SIZE..fk_end])?;
        let primary_key = self
            .primary_key_codec
            .deserialize(&topics.primary_key, &bytes[fk_end..])?;

        Ok(CombinedKey::new(Some(foreign_key), primary_key))
    }

    /// Common prefix of every combined key with this foreign key.
    pub fn prefix_bytes(&self, foreign_key: &FK) -> Result<Vec<u8>> {
        let topics = self.topics()?;
        let fk_bytes = self
            .foreign_key_codec
            .serialize(&topics.foreign_key, foreign_key)?;

        let mut out = Vec::with_capacity(LENGTH_PREFIX_SIZE + fk_bytes.len());
        write_prefix(&mut out, &fk_bytes)?;
        Ok(out)
    }

    /// Half-open byte range covering every combined key with this foreign key.
    ///
    /// The end is `None` when the prefix has no finite successor.
    pub fn prefix_range(&self, foreign_key: &FK) -> Result<(Vec<u8>, Option<Vec<u8>>)> {
        let start = self.prefix_bytes(foreign_key)?;
        let end = prefix_exclusive_end(&start);
        Ok((start, end))
    }
}

fn write_prefix(out: &mut Vec<u8>, fk_bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(fk_bytes.len()).map_err(|_| {
        JoinError::Serialization(format!(
            "foreign key of {} bytes exceeds length prefix",
            fk_bytes.len()
        ))
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(fk_bytes);
    Ok(())
}

/// Smallest byte string greater than every string starting with `prefix`.
pub fn prefix_exclusive_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut out = prefix.to_vec();
    for idx in (0..out.len()).rev() {
        if out[idx] != u8::MAX {
            out[idx] += 1;
            out.truncate(idx + 1);
            return Some(out);
        }
    }
    None
}
