//! Single-partition task driving a processor's lifecycle.
//!
//! Partition assignment and store handoff happen outside this crate; a task
//! only guarantees that its processor sees records sequentially and that a
//! fatal error stops it for good.

use crate::error::{JoinError, Result};
use crate::processor::Processor;
use crate::types::{Record, TaskId};
use std::marker::PhantomData;
use tracing::{debug, error};

/// Lifecycle state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Running,
    /// A fatal error occurred; no further records are accepted.
    Halted,
    Closed,
}

/// Owns one processor for one partition.
pub struct PartitionTask<P, K, V> {
    id: TaskId,
    processor: P,
    state: TaskState,
    processed: u64,
    _marker: PhantomData<fn(K, V)>,
}

impl<P, K, V> PartitionTask<P, K, V>
where
    P: Processor<K, V>,
{
    pub fn new(id: TaskId, processor: P) -> Self {
        Self {
            id,
            processor,
            state: TaskState::Created,
            processed: 0,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Records handed to the processor without error, drops included.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Initialize the processor. A failure halts the task.
    pub fn start(&mut self, context: P::Context) -> Result<()> {
        if self.state != TaskState::Created {
            return Err(JoinError::InvalidConfig(format!(
                "task {} cannot start from state {:?}",
                self.id, self.state
            )));
        }

        if let Err(e) = self.processor.init(context) {
            error!(task = %self.id, error = %e, "Task failed to start");
            self.state = TaskState::Halted;
            return Err(e);
        }

        debug!(task = %self.id, "Task started");
        self.state = TaskState::Running;
        Ok(())
    }

    /// Process one record.
    ///
    /// Fatal errors halt the task and are returned; the same record is never
    /// retried here. Other errors are returned for the caller's policy.
    pub fn process(&mut self, record: Record<K, V>) -> Result<()> {
        match self.state {
            TaskState::Running => {}
            TaskState::Halted => return Err(JoinError::TaskHalted),
            TaskState::Created | TaskState::Closed => return Err(JoinError::NotInitialized),
        }

        match self.processor.process(record) {
            Ok(()) => {
                self.processed += 1;
                Ok(())
            }
            Err(e) if e.is_fatal() => {
                error!(task = %self.id, error = %e, "Halting task after fatal error");
                self.state = TaskState::Halted;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Process records in order, stopping at the first error.
    pub fn process_all<I>(&mut self, records: I) -> Result<u64>
    where
        I: IntoIterator<Item = Record<K, V>>,
    {
        let mut count = 0;
        for record in records {
            self.process(record)?;
            count += 1;
        }
        Ok(count)
    }

    /// Close the processor, e.g. when the partition is revoked.
    pub fn close(&mut self) {
        if self.state == TaskState::Closed {
            return;
        }
        self.processor.close();
        self.state = TaskState::Closed;
        debug!(task = %self.id, processed = self.processed, "Task closed");
    }
}
