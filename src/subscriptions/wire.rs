//! Binary wire format for subscription wrappers.
//!
//! ```text
//! byte 0      : version (low 7 bits) | 0x80 if the value hash is absent
//! byte 1      : instruction code
//! 16 bytes    : value hash (only if present)
//! 4 bytes BE  : primary partition (version >= 1)
//! remainder   : primary key bytes
//! ```

use crate::codec::KeyCodec;
use crate::error::{JoinError, Result};
use crate::types::ValueHash;
use std::sync::Arc;

use super::{Instruction, SubscriptionWrapper, CURRENT_VERSION};

/// Header bit marking an absent value hash.
const HASH_ABSENT_FLAG: u8 = 0x80;

/// Mask for the version bits of the header.
const VERSION_MASK: u8 = 0x7f;

const PARTITION_SIZE: usize = 4;

/// Serializer/deserializer for [`SubscriptionWrapper`].
pub struct SubscriptionWrapperSerde<PK> {
    primary_key_codec: Arc<dyn KeyCodec<PK>>,
}

impl<PK> Clone for SubscriptionWrapperSerde<PK> {
    fn clone(&self) -> Self {
        Self {
            primary_key_codec: Arc::clone(&self.primary_key_codec),
        }
    }
}

impl<PK> SubscriptionWrapperSerde<PK> {
    pub fn new(primary_key_codec: Arc<dyn KeyCodec<PK>>) -> Self {
        Self { primary_key_codec }
    }

    pub fn serialize(&self, topic: &str, wrapper: &SubscriptionWrapper<PK>) -> Result<Vec<u8>> {
        let version = wrapper.version();
        if version > VERSION_MASK {
            return Err(JoinError::Serialization(format!(
                "version {} does not fit the header",
                version
            )));
        }

        let pk_bytes = self
            .primary_key_codec
            .serialize(topic, wrapper.primary_key())?;

        let mut out = Vec::with_capacity(2 + ValueHash::LEN + PARTITION_SIZE + pk_bytes.len());
        let flag = if wrapper.hash().is_none() {
            HASH_ABSENT_FLAG
        } else {
            0
        };
        out.push(version | flag);
        out.push(wrapper.instruction().code());

        if let Some(hash) = wrapper.hash() {
            out.extend_from_slice(&hash.0);
        }

        if version >= 1 {
            let partition = wrapper.primary_partition().ok_or_else(|| {
                JoinError::Serialization(format!(
                    "version {} wrapper is missing its primary partition",
                    version
                ))
            })?;
            out.extend_from_slice(&partition.to_be_bytes());
        }

        out.extend_from_slice(&pk_bytes);
        Ok(out)
    }

    /// Decode a wrapper.
    ///
    /// Versions newer than this build fail with
    /// [`JoinError::UnsupportedVersion`]: their layout is unknown.
    pub fn deserialize(&self, topic: &str, bytes: &[u8]) -> Result<SubscriptionWrapper<PK>> {
        if bytes.len() < 2 {
            return Err(JoinError::InvalidFormat(format!(
                "subscription wrapper too short: {} bytes",
                bytes.len()
            )));
        }

        let version = bytes[0] & VERSION_MASK;
        let hash_absent = bytes[0] & HASH_ABSENT_FLAG != 0;
        if version > CURRENT_VERSION {
            return Err(JoinError::UnsupportedVersion {
                version,
                supported: CURRENT_VERSION,
            });
        }

        let instruction = Instruction::from_code(bytes[1])?;
        let mut pos = 2;

        let hash = if hash_absent {
            None
        } else {
            let raw = take(bytes, &mut pos, ValueHash::LEN, "value hash")?;
            let mut arr = [0u8; ValueHash::LEN];
            arr.copy_from_slice(raw);
            Some(ValueHash(arr))
        };

        let primary_partition = if version >= 1 {
            let raw = take(bytes, &mut pos, PARTITION_SIZE, "primary partition")?;
            let mut arr = [0u8; PARTITION_SIZE];
            arr.copy_from_slice(raw);
            Some(i32::from_be_bytes(arr))
        } else {
            None
        };

        let primary_key = self.primary_key_codec.deserialize(topic, &bytes[pos..])?;

        SubscriptionWrapper::with_version(version, hash, instruction, primary_key, primary_partition)
    }
}

fn take<'a>(bytes: &'a [u8], pos: &mut usize, len: usize, what: &str) -> Result<&'a [u8]> {
    let end = *pos + len;
    if end > bytes.len() {
        return Err(JoinError::InvalidFormat(format!(
            "truncated {}: need {} bytes at offset {}, have {}",
            what,
            len,
            pos,
            bytes.len()
        )));
    }
    let slice = &bytes[*pos..end];
    *pos = end;
    Ok(slice)
}
