//! Task-scoped metrics.
//!
//! Sensors are registered per `(name, thread, task)` and shared by every
//! processor instance of that task. Exporting them is left to the embedding
//! application, which can read [`StreamsMetrics::snapshot`].

use crate::types::TaskId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Sensor name for records skipped by a processor.
pub const DROPPED_RECORDS: &str = "dropped-records";

/// Metric group for task-level sensors.
pub const TASK_LEVEL_GROUP: &str = "stream-task-metrics";

/// Identity of a registered sensor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetricName {
    pub name: String,
    pub group: String,
    pub thread: String,
    pub task: TaskId,
}

/// Monotonically increasing counter.
#[derive(Debug)]
pub struct Sensor {
    name: MetricName,
    count: AtomicU64,
}

impl Sensor {
    fn new(name: MetricName) -> Self {
        Self {
            name,
            count: AtomicU64::new(0),
        }
    }

    /// Record one occurrence.
    pub fn record(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &MetricName {
        &self.name
    }
}

/// Registry of sensors for one application instance.
pub struct StreamsMetrics {
    sensors: RwLock<HashMap<MetricName, Arc<Sensor>>>,
}

impl StreamsMetrics {
    pub fn new() -> Self {
        Self {
            sensors: RwLock::new(HashMap::new()),
        }
    }

    /// Get or register the dropped-records sensor for a thread and task.
    pub fn dropped_records_sensor(&self, thread: &str, task: TaskId) -> Arc<Sensor> {
        self.task_sensor(DROPPED_RECORDS, thread, task)
    }

    fn task_sensor(&self, name: &str, thread: &str, task: TaskId) -> Arc<Sensor> {
        let key = MetricName {
            name: name.to_string(),
            group: TASK_LEVEL_GROUP.to_string(),
            thread: thread.to_string(),
            task,
        };

        if let Some(sensor) = self.sensors.read().get(&key) {
            return Arc::clone(sensor);
        }

        let mut sensors = self.sensors.write();
        Arc::clone(
            sensors
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Sensor::new(key))),
        )
    }

    /// Get sensor count.
    pub fn sensor_count(&self) -> usize {
        self.sensors.read().len()
    }

    /// Current value of every sensor.
    pub fn snapshot(&self) -> Vec<(MetricName, u64)> {
        self.sensors
            .read()
            .iter()
            .map(|(name, sensor)| (name.clone(), sensor.count()))
            .collect()
    }
}

impl Default for StreamsMetrics {
    fn default() -> Self {
        Self::new()
    }
}
