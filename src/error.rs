//! Error types for the subscription receive stage.

use thiserror::Error;

/// Main error type for join operations.
#[derive(Debug, Error)]
pub enum JoinError {
    /// The wrapper was produced by a newer build and cannot be interpreted.
    #[error("SubscriptionWrapper is of an incompatible version: {version} (supported up to {supported})")]
    UnsupportedVersion { version: u8, supported: u8 },

    #[error("State store not found: {0}")]
    StoreNotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Processor not initialized")]
    NotInitialized,

    #[error("Key schema not initialized")]
    SchemaNotInitialized,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown instruction code: {0}")]
    UnknownInstruction(u8),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Downstream closed")]
    DownstreamClosed,

    #[error("Task halted after fatal error")]
    TaskHalted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JoinError {
    /// Whether the owning task must halt rather than continue or retry.
    ///
    /// A closed downstream cannot reopen, and the store write for the record
    /// that hit it has already happened.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            JoinError::UnsupportedVersion { .. }
                | JoinError::StoreNotFound(_)
                | JoinError::SchemaNotInitialized
                | JoinError::InvalidConfig(_)
                | JoinError::DownstreamClosed
                | JoinError::TaskHalted
        )
    }
}

impl From<serde_json::Error> for JoinError {
    fn from(e: serde_json::Error) -> Self {
        JoinError::InvalidConfig(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for JoinError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        JoinError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for JoinError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        JoinError::Deserialization(e.to_string())
    }
}

/// Result type for join operations.
pub type Result<T> = std::result::Result<T, JoinError>;
