//! Store wrapper that counts accesses and can inject failures.

use crate::error::{JoinError, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::{StoredSubscription, SubscriptionStore};

/// Snapshot of the operations issued against a [`RecordingStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreAccess {
    pub gets: u64,
    pub puts: u64,
    pub deletes: u64,
}

impl StoreAccess {
    /// Whether any operation touched the store.
    pub fn is_untouched(&self) -> bool {
        self.gets == 0 && self.puts == 0 && self.deletes == 0
    }

    pub fn writes(&self) -> u64 {
        self.puts + self.deletes
    }
}

/// Delegating store that records every get, put and delete.
pub struct RecordingStore<PK> {
    inner: Arc<dyn SubscriptionStore<PK>>,
    gets: AtomicU64,
    puts: AtomicU64,
    deletes: AtomicU64,
    fail_writes: AtomicBool,
}

impl<PK> RecordingStore<PK> {
    pub fn new(inner: Arc<dyn SubscriptionStore<PK>>) -> Self {
        Self {
            inner,
            gets: AtomicU64::new(0),
            puts: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn access(&self) -> StoreAccess {
        StoreAccess {
            gets: self.gets.load(Ordering::SeqCst),
            puts: self.puts.load(Ordering::SeqCst),
            deletes: self.deletes.load(Ordering::SeqCst),
        }
    }

    pub fn reset(&self) {
        self.gets.store(0, Ordering::SeqCst);
        self.puts.store(0, Ordering::SeqCst);
        self.deletes.store(0, Ordering::SeqCst);
    }

    /// Make subsequent puts and deletes fail with [`JoinError::Store`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(JoinError::Store(format!(
                "injected write failure on {}",
                self.inner.name()
            )))
        } else {
            Ok(())
        }
    }
}

impl<PK> SubscriptionStore<PK> for RecordingStore<PK> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, key: &[u8]) -> Result<Option<StoredSubscription<PK>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn put(&self, key: Vec<u8>, value: StoredSubscription<PK>) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<Option<StoredSubscription<PK>>> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        self.inner.delete(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, StoredSubscription<PK>)>> {
        self.inner.prefix_scan(prefix)
    }

    fn approximate_len(&self) -> usize {
        self.inner.approximate_len()
    }
}
