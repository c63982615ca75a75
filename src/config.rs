//! Configuration for the receive stage.

use crate::codec::KeyCodec;
use crate::error::{JoinError, Result};
use crate::schema::CombinedKeySchema;
use crate::store::InMemoryStoreFactory;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Names shared by every task of one join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Application id; prefixes the serde topic names.
    pub application_id: String,

    /// Name the subscription store is registered under.
    pub subscription_store_name: String,

    /// Topic suffix handed to the foreign-key codec.
    pub foreign_key_topic_suffix: String,

    /// Topic suffix handed to the primary-key codec.
    pub primary_key_topic_suffix: String,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            application_id: "fk-join".to_string(),
            subscription_store_name: "subscription-state-store".to_string(),
            foreign_key_topic_suffix: "subscription-registration-topic".to_string(),
            primary_key_topic_suffix: "subscription-response-topic".to_string(),
        }
    }
}

impl JoinConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: JoinConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("application_id", &self.application_id),
            ("subscription_store_name", &self.subscription_store_name),
            ("foreign_key_topic_suffix", &self.foreign_key_topic_suffix),
            ("primary_key_topic_suffix", &self.primary_key_topic_suffix),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(JoinError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    /// In-memory factory for the configured store name.
    pub fn store_factory(&self) -> InMemoryStoreFactory {
        InMemoryStoreFactory::new(self.subscription_store_name.clone())
    }

    /// Key schema using the configured topic suffixes.
    pub fn key_schema<FK, PK>(
        &self,
        foreign_key_codec: Arc<dyn KeyCodec<FK>>,
        primary_key_codec: Arc<dyn KeyCodec<PK>>,
    ) -> CombinedKeySchema<FK, PK> {
        CombinedKeySchema::new(
            self.foreign_key_topic_suffix.clone(),
            foreign_key_codec,
            self.primary_key_topic_suffix.clone(),
            primary_key_codec,
        )
    }
}
