//! Store factories.

use crate::error::{JoinError, Result};
use std::sync::Arc;

use super::{InMemorySubscriptionStore, SubscriptionStore};

/// Builds a named store for one task.
///
/// Persistence configuration lives behind the factory; the receive stage
/// only asks for a store by name.
pub trait StoreFactory<PK>: Send + Sync {
    fn store_name(&self) -> &str;

    fn build(&self) -> Result<Arc<dyn SubscriptionStore<PK>>>;
}

/// Factory producing fresh in-memory stores.
#[derive(Clone, Debug)]
pub struct InMemoryStoreFactory {
    name: String,
}

impl InMemoryStoreFactory {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<PK> StoreFactory<PK> for InMemoryStoreFactory
where
    PK: Clone + Send + Sync + 'static,
{
    fn store_name(&self) -> &str {
        &self.name
    }

    fn build(&self) -> Result<Arc<dyn SubscriptionStore<PK>>> {
        if self.name.is_empty() {
            return Err(JoinError::InvalidConfig("store name must not be empty".into()));
        }
        Ok(Arc::new(InMemorySubscriptionStore::new(self.name.clone())))
    }
}
