//! Processor lifecycle and the per-task context.
//!
//! A processor is created once per partition assignment, bound to its
//! context with `init`, fed records one at a time with `process`, and
//! released with `close` when the partition is revoked.

mod context;
mod receive;

pub use context::ProcessorContext;
pub use receive::{
    ReceiveContext, SubscriptionChange, SubscriptionReceiveProcessor,
    SubscriptionReceiveProcessorSupplier,
};

use crate::error::Result;
use crate::types::{Record, TaskId};

/// Identity information every context exposes.
pub trait StreamsContext {
    fn application_id(&self) -> &str;

    fn task_id(&self) -> TaskId;
}

/// A stateful record processor owned by exactly one task.
pub trait Processor<K, V> {
    type Context;

    /// Bind to the task's context. Errors here are configuration errors.
    fn init(&mut self, context: Self::Context) -> Result<()>;

    /// Handle one record. Runs to completion before the next record.
    fn process(&mut self, record: Record<K, V>) -> Result<()>;

    /// Release the context and any store handles.
    fn close(&mut self) {}
}
