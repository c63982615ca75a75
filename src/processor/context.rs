//! Per-task processor context.

use crate::error::{JoinError, Result};
use crate::metrics::StreamsMetrics;
use crate::store::{StoreFactory, SubscriptionStore};
use crate::types::{Record, TaskId};
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::sync::Arc;

use super::StreamsContext;

/// Everything a processor needs from its task: identity, metrics, named
/// state stores, and the downstream edge.
pub struct ProcessorContext<PK, K, V> {
    application_id: String,
    task_id: TaskId,
    thread_name: Option<String>,
    metrics: Arc<StreamsMetrics>,
    stores: HashMap<String, Arc<dyn SubscriptionStore<PK>>>,
    downstream: Sender<Record<K, V>>,
}

impl<PK, K, V> ProcessorContext<PK, K, V> {
    /// Create a context.
    pub fn new(
        application_id: impl Into<String>,
        task_id: TaskId,
        metrics: Arc<StreamsMetrics>,
        downstream: Sender<Record<K, V>>,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            task_id,
            thread_name: None,
            metrics,
            stores: HashMap::new(),
            downstream,
        }
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = Some(thread_name.into());
        self
    }

    /// Build a store with the factory and register it under its name.
    pub fn register_store(
        &mut self,
        factory: &dyn StoreFactory<PK>,
    ) -> Result<Arc<dyn SubscriptionStore<PK>>> {
        let store = factory.build()?;
        self.add_store(Arc::clone(&store));
        Ok(store)
    }

    /// Register an already built store under its own name.
    pub fn add_store(&mut self, store: Arc<dyn SubscriptionStore<PK>>) {
        self.stores.insert(store.name().to_string(), store);
    }

    /// Look up a registered store.
    pub fn state_store(&self, name: &str) -> Result<Arc<dyn SubscriptionStore<PK>>> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| JoinError::StoreNotFound(name.to_string()))
    }

    pub fn metrics(&self) -> &Arc<StreamsMetrics> {
        &self.metrics
    }

    /// Name of the stream thread.
    ///
    /// Unless set with [`with_thread_name`](Self::with_thread_name), this is
    /// the name of the thread calling it, not the one that built the context.
    pub fn thread_name(&self) -> String {
        match &self.thread_name {
            Some(name) => name.clone(),
            None => std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
        }
    }

    /// Send a record to the downstream processor.
    pub fn forward(&self, record: Record<K, V>) -> Result<()> {
        self.downstream
            .send(record)
            .map_err(|_| JoinError::DownstreamClosed)
    }
}

impl<PK, K, V> StreamsContext for ProcessorContext<PK, K, V> {
    fn application_id(&self) -> &str {
        &self.application_id
    }

    fn task_id(&self) -> TaskId {
        self.task_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStoreFactory;
    use crate::types::Timestamp;
    use crossbeam_channel::unbounded;

    type TestContext = ProcessorContext<u64, String, u32>;

    #[test]
    fn test_store_lookup_by_name() {
        let (tx, _rx) = unbounded();
        let mut context: TestContext =
            ProcessorContext::new("app", TaskId::new(0, 0), Arc::new(StreamsMetrics::new()), tx);

        context
            .register_store(&InMemoryStoreFactory::new("subs"))
            .unwrap();

        assert!(context.state_store("subs").is_ok());
        assert!(matches!(
            context.state_store("missing"),
            Err(JoinError::StoreNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_forward_after_downstream_closed() {
        let (tx, rx) = unbounded();
        let context: TestContext =
            ProcessorContext::new("app", TaskId::new(0, 0), Arc::new(StreamsMetrics::new()), tx)
                .with_thread_name("stream-thread-7");

        context
            .forward(Record::new(Some("k".to_string()), 1, Timestamp(5)))
            .unwrap();
        assert_eq!(rx.recv().unwrap().value, 1);

        drop(rx);
        let result = context.forward(Record::new(None, 2, Timestamp(6)));
        assert!(matches!(result, Err(JoinError::DownstreamClosed)));
        assert_eq!(context.thread_name(), "stream-thread-7");
    }

    #[test]
    fn test_thread_name_resolved_on_calling_thread() {
        let (tx, _rx) = unbounded();
        let context: TestContext =
            ProcessorContext::new("app", TaskId::new(0, 0), Arc::new(StreamsMetrics::new()), tx);

        let name = std::thread::Builder::new()
            .name("stream-thread-3".into())
            .spawn(move || context.thread_name())
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name, "stream-thread-3");
    }
}
