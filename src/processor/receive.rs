//! Receive side of the foreign-key subscription protocol.
//!
//! Records arrive keyed by foreign key and carry a [`SubscriptionWrapper`].
//! Each one is re-keyed by `(foreign key, primary key)`, applied to the
//! subscription store, and forwarded as a before/after change so the join
//! stage can compute deltas without keeping its own history.

use crate::error::{JoinError, Result};
use crate::metrics::Sensor;
use crate::schema::{CombinedKey, CombinedKeySchema};
use crate::store::{StoreFactory, StoredSubscription, SubscriptionStore};
use crate::subscriptions::{Instruction, StoreEffect, SubscriptionWrapper};
use crate::types::{Change, Record, RecordMetadata, ValueAndTimestamp};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Processor, ProcessorContext, StreamsContext};

/// Value emitted per processed subscription.
///
/// `instruction` is the one carried by the incoming wrapper. On deletes the
/// new side of the change is empty, so this is where the join stage tells
/// `DELETE_KEY_AND_PROPAGATE` from `DELETE_KEY_NO_PROPAGATE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionChange<PK> {
    pub instruction: Instruction,
    pub change: Change<StoredSubscription<PK>>,
}

/// Context type of the receive processor.
pub type ReceiveContext<FK, PK> =
    ProcessorContext<PK, CombinedKey<FK, PK>, SubscriptionChange<PK>>;

/// Handles bound at `init`.
struct Bound<FK, PK> {
    context: ReceiveContext<FK, PK>,
    store: Arc<dyn SubscriptionStore<PK>>,
    dropped_records: Arc<Sensor>,
}

impl<FK, PK> Bound<FK, PK> {
    fn drop_record(&self, metadata: Option<&RecordMetadata>) {
        match metadata {
            Some(origin) => warn!(
                topic = %origin.topic,
                partition = origin.partition,
                offset = origin.offset,
                "Skipping record due to null foreign key"
            ),
            None => warn!(
                "Skipping record due to null foreign key. Topic, partition, and offset not known."
            ),
        }
        self.dropped_records.record();
    }
}

/// Per-partition processor maintaining the subscription store.
pub struct SubscriptionReceiveProcessor<FK, PK> {
    store_name: String,
    key_schema: CombinedKeySchema<FK, PK>,
    bound: Option<Bound<FK, PK>>,
}

impl<FK, PK> SubscriptionReceiveProcessor<FK, PK>
where
    PK: Clone,
{
    pub fn new(store_name: impl Into<String>, key_schema: CombinedKeySchema<FK, PK>) -> Self {
        Self {
            store_name: store_name.into(),
            key_schema,
            bound: None,
        }
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn is_initialized(&self) -> bool {
        self.bound.is_some()
    }

    /// Work out the change for a record and apply it to the store.
    ///
    /// At most one read and one write per call.
    fn infer_change(
        &self,
        store: &dyn SubscriptionStore<PK>,
        record: &Record<FK, SubscriptionWrapper<PK>>,
    ) -> Result<Change<StoredSubscription<PK>>> {
        let new_value = ValueAndTimestamp::make(record.value.clone(), record.timestamp);
        let effect = record
            .value
            .instruction()
            .store_effect(record.key.is_some());

        let foreign_key = match &record.key {
            Some(fk) if effect != StoreEffect::Skip => fk,
            // No combined key to index by.
            _ => return Ok(Change::new(Some(new_value), None)),
        };

        let subscription_key = self
            .key_schema
            .to_bytes(foreign_key, record.value.primary_key())?;
        let old_value = store.get(&subscription_key)?;

        if effect == StoreEffect::Delete {
            store.delete(&subscription_key)?;
            Ok(Change::new(None, old_value))
        } else {
            store.put(subscription_key, new_value.clone())?;
            Ok(Change::new(Some(new_value), old_value))
        }
    }
}

impl<FK, PK> Processor<FK, SubscriptionWrapper<PK>> for SubscriptionReceiveProcessor<FK, PK>
where
    PK: Clone,
{
    type Context = ReceiveContext<FK, PK>;

    fn init(&mut self, context: Self::Context) -> Result<()> {
        let store = context.state_store(&self.store_name)?;
        let dropped_records = context
            .metrics()
            .dropped_records_sensor(&context.thread_name(), context.task_id());
        self.key_schema.init(&context)?;

        debug!(
            task = %context.task_id(),
            store = %self.store_name,
            "Initialized subscription receive processor"
        );

        self.bound = Some(Bound {
            context,
            store,
            dropped_records,
        });
        Ok(())
    }

    fn process(&mut self, record: Record<FK, SubscriptionWrapper<PK>>) -> Result<()> {
        let bound = self.bound.as_ref().ok_or(JoinError::NotInitialized)?;

        // A newer wrapper may carry instructions this build cannot interpret.
        // Halting is the only safe response; retrying would fail identically.
        record.value.check_version()?;

        let instruction = record.value.instruction();
        if record.key.is_none() && !instruction.allows_null_foreign_key() {
            bound.drop_record(record.metadata.as_ref());
            return Ok(());
        }

        let change = self.infer_change(bound.store.as_ref(), &record)?;

        let Record {
            key,
            value,
            timestamp,
            metadata,
        } = record;
        let combined_key = CombinedKey::new(key, value.into_primary_key());

        bound.context.forward(Record {
            key: Some(combined_key),
            value: SubscriptionChange {
                instruction,
                change,
            },
            timestamp,
            metadata,
        })
    }

    fn close(&mut self) {
        if let Some(bound) = self.bound.take() {
            debug!(
                task = %bound.context.task_id(),
                store = %self.store_name,
                "Closed subscription receive processor"
            );
        }
    }
}

/// Creates receive processors and declares the store they need.
pub struct SubscriptionReceiveProcessorSupplier<FK, PK> {
    store_factory: Arc<dyn StoreFactory<PK>>,
    key_schema: CombinedKeySchema<FK, PK>,
}

impl<FK, PK> SubscriptionReceiveProcessorSupplier<FK, PK>
where
    PK: Clone,
{
    pub fn new(
        store_factory: Arc<dyn StoreFactory<PK>>,
        key_schema: CombinedKeySchema<FK, PK>,
    ) -> Self {
        Self {
            store_factory,
            key_schema,
        }
    }

    /// Factory of the subscription store every processor reads and writes.
    pub fn store_factory(&self) -> Arc<dyn StoreFactory<PK>> {
        Arc::clone(&self.store_factory)
    }

    /// A fresh, uninitialized processor.
    pub fn get(&self) -> SubscriptionReceiveProcessor<FK, PK> {
        SubscriptionReceiveProcessor::new(
            self.store_factory.store_name(),
            self.key_schema.clone(),
        )
    }
}
