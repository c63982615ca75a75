//! In-memory ordered subscription store.

use crate::error::Result;
use crate::schema::prefix_exclusive_end;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

use super::{StoredSubscription, SubscriptionStore};

/// `BTreeMap`-backed store. Keys sort bytewise, matching the combined-key
/// layout, so prefix scans are plain range reads.
pub struct InMemorySubscriptionStore<PK> {
    name: String,
    entries: RwLock<BTreeMap<Vec<u8>, StoredSubscription<PK>>>,
}

impl<PK> InMemorySubscriptionStore<PK> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<PK> SubscriptionStore<PK> for InMemorySubscriptionStore<PK>
where
    PK: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &[u8]) -> Result<Option<StoredSubscription<PK>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: Vec<u8>, value: StoredSubscription<PK>) -> Result<()> {
        self.entries.write().insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<Option<StoredSubscription<PK>>> {
        Ok(self.entries.write().remove(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, StoredSubscription<PK>)>> {
        let upper = match prefix_exclusive_end(prefix) {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };

        let entries = self.entries.read();
        Ok(entries
            .range::<Vec<u8>, _>((Bound::Included(prefix.to_vec()), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn approximate_len(&self) -> usize {
        self.entries.read().len()
    }
}
