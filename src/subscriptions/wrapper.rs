//! The versioned subscription envelope.

use crate::error::{JoinError, Result};
use crate::types::ValueHash;
use serde::{Deserialize, Serialize};

use super::Instruction;

/// Highest wrapper version this build can interpret.
///
/// Version 0 had no primary partition; version 1 added it.
pub const CURRENT_VERSION: u8 = 1;

/// A primary key's current interest in a foreign key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWrapper<PK> {
    hash: Option<ValueHash>,
    instruction: Instruction,
    primary_key: PK,
    version: u8,
    primary_partition: Option<i32>,
}

impl<PK> SubscriptionWrapper<PK> {
    /// Create a wrapper at the current version.
    pub fn new(
        hash: Option<ValueHash>,
        instruction: Instruction,
        primary_key: PK,
        primary_partition: i32,
    ) -> Self {
        Self {
            hash,
            instruction,
            primary_key,
            version: CURRENT_VERSION,
            primary_partition: Some(primary_partition),
        }
    }

    /// Create a wrapper at an explicit version.
    ///
    /// Versions above [`CURRENT_VERSION`] are accepted here so that records
    /// from newer producers can be represented; they are rejected on use.
    pub fn with_version(
        version: u8,
        hash: Option<ValueHash>,
        instruction: Instruction,
        primary_key: PK,
        primary_partition: Option<i32>,
    ) -> Result<Self> {
        if version >= 1 && primary_partition.is_none() {
            return Err(JoinError::InvalidFormat(format!(
                "primary partition is required from version 1 (got version {})",
                version
            )));
        }
        Ok(Self {
            hash,
            instruction,
            primary_key,
            version,
            primary_partition,
        })
    }

    pub fn hash(&self) -> Option<&ValueHash> {
        self.hash.as_ref()
    }

    pub fn instruction(&self) -> Instruction {
        self.instruction
    }

    pub fn primary_key(&self) -> &PK {
        &self.primary_key
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn primary_partition(&self) -> Option<i32> {
        self.primary_partition
    }

    pub fn into_primary_key(self) -> PK {
        self.primary_key
    }

    pub fn is_supported_version(&self) -> bool {
        self.version <= CURRENT_VERSION
    }

    /// Fail if this wrapper came from a newer, uninterpretable protocol.
    pub fn check_version(&self) -> Result<()> {
        if self.is_supported_version() {
            Ok(())
        } else {
            Err(JoinError::UnsupportedVersion {
                version: self.version,
                supported: CURRENT_VERSION,
            })
        }
    }
}
