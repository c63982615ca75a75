//! Subscription store contract and implementations.
//!
//! The receive stage only ever issues `get`, `put` and `delete`. Ordered
//! prefix scans exist for the downstream stage that looks up every primary
//! key subscribed to a foreign key.

mod factory;
mod memory;
mod recording;

pub use factory::{InMemoryStoreFactory, StoreFactory};
pub use memory::InMemorySubscriptionStore;
pub use recording::{RecordingStore, StoreAccess};

use crate::error::Result;
use crate::subscriptions::SubscriptionWrapper;
use crate::types::ValueAndTimestamp;

/// Value held per combined key.
pub type StoredSubscription<PK> = ValueAndTimestamp<SubscriptionWrapper<PK>>;

/// Ordered key-value store keyed by encoded combined-key bytes.
///
/// Implementations use interior mutability so one handle can be shared
/// between the owning processor and the task that created it.
pub trait SubscriptionStore<PK>: Send + Sync {
    /// Well-known name the store is registered under.
    fn name(&self) -> &str;

    fn get(&self, key: &[u8]) -> Result<Option<StoredSubscription<PK>>>;

    /// Insert or overwrite.
    fn put(&self, key: Vec<u8>, value: StoredSubscription<PK>) -> Result<()>;

    /// Remove a key, returning the previous value. Missing keys are a no-op.
    fn delete(&self, key: &[u8]) -> Result<Option<StoredSubscription<PK>>>;

    /// All entries whose key starts with `prefix`, in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, StoredSubscription<PK>)>>;

    fn approximate_len(&self) -> usize;
}
