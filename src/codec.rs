//! Byte codecs for user key types.
//!
//! Key types are opaque to the receive stage; it only needs a deterministic
//! byte form for each key. The topic name is passed through so codecs that
//! depend on a schema registry subject can resolve it.

use crate::error::{JoinError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Serializes and deserializes one key type.
pub trait KeyCodec<T>: Send + Sync {
    fn serialize(&self, topic: &str, value: &T) -> Result<Vec<u8>>;
    fn deserialize(&self, topic: &str, bytes: &[u8]) -> Result<T>;
}

/// MessagePack codec for any serde type.
pub struct MsgPackCodec<T>(PhantomData<fn() -> T>);

impl<T> MsgPackCodec<T> {
    pub fn new() -> Self {
        MsgPackCodec(PhantomData)
    }
}

impl<T> Default for MsgPackCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KeyCodec<T> for MsgPackCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, _topic: &str, value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec(value)?)
    }

    fn deserialize(&self, _topic: &str, bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

/// Raw UTF-8 codec for string keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringCodec;

impl KeyCodec<String> for StringCodec {
    fn serialize(&self, _topic: &str, value: &String) -> Result<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }

    fn deserialize(&self, _topic: &str, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| JoinError::Deserialization(e.to_string()))
    }
}
