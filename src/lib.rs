//! # Subscription Join
//!
//! Receive stage of a foreign-key table-table join.
//!
//! The primary side of the join sends a [`SubscriptionWrapper`] to the
//! partition owning each record's foreign key. This crate consumes those
//! wrappers, keeps a subscription store indexed by `(foreign key, primary
//! key)`, and emits before/after changes for the join stage.
//!
//! ## Core Concepts
//!
//! - **Combined keys**: length-prefixed foreign key followed by the primary
//!   key, so one foreign key's subscribers form a contiguous range
//! - **Instructions**: closed set of directives deciding put vs delete
//! - **Versioning**: wrappers from newer builds halt the task
//!
//! ## Example
//!
//! ```ignore
//! use subscription_join::*;
//!
//! let config = JoinConfig::default();
//! let supplier = SubscriptionReceiveProcessorSupplier::new(
//!     Arc::new(config.store_factory()),
//!     config.key_schema(Arc::new(MsgPackCodec::<u64>::new()), Arc::new(MsgPackCodec::<u64>::new())),
//! );
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let mut context = ProcessorContext::new(&config.application_id, TaskId::new(0, 0), metrics, tx);
//! context.register_store(supplier.store_factory().as_ref())?;
//!
//! let mut task = PartitionTask::new(TaskId::new(0, 0), supplier.get());
//! task.start(context)?;
//! task.process(Record::new(Some(7), wrapper, Timestamp(0)))?;
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod metrics;
pub mod processor;
pub mod schema;
pub mod store;
pub mod subscriptions;
pub mod task;
pub mod types;

// Re-exports
pub use codec::{KeyCodec, MsgPackCodec, StringCodec};
pub use config::JoinConfig;
pub use error::{JoinError, Result};
pub use metrics::{MetricName, Sensor, StreamsMetrics};
pub use processor::{
    Processor, ProcessorContext, ReceiveContext, StreamsContext, SubscriptionChange,
    SubscriptionReceiveProcessor, SubscriptionReceiveProcessorSupplier,
};
pub use schema::{CombinedKey, CombinedKeySchema};
pub use store::{
    InMemoryStoreFactory, InMemorySubscriptionStore, RecordingStore, StoreAccess, StoreFactory,
    StoredSubscription, SubscriptionStore,
};
pub use subscriptions::{
    Instruction, StoreEffect, SubscriptionWrapper, SubscriptionWrapperSerde, CURRENT_VERSION,
};
pub use task::{PartitionTask, TaskState};
pub use types::*;
