//! Activity metrics emission.
//!
//! The engine reports lifecycle events to a [`MetricsSink`] labeled by
//! category name. The default [`TracingSink`] emits them as structured
//! `tracing` events on the `metrics` target; [`RecordingSink`] captures them
//! for assertions.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// Lifecycle events that are counted per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityEvent {
    Started,
    Finished,
    Updated,
    Deleted,
}

impl ActivityEvent {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for activity metrics.
///
/// Implementations must not block; the engine already calls them from
/// background tasks, never from the request path.
pub trait MetricsSink: Send + Sync {
    /// Increments the counter for `event` in `category`.
    fn count(&self, event: ActivityEvent, category: &str);

    /// Observes the time elapsed since `since` for `event` in `category`.
    fn duration_observed(&self, event: ActivityEvent, category: &str, since: DateTime<Utc>);
}

/// Emits metrics as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn count(&self, event: ActivityEvent, category: &str) {
        tracing::info!(
            target: "metrics",
            metric = "activities_counter",
            context = event.as_str(),
            category,
            value = 1_u64
        );
    }

    fn duration_observed(&self, event: ActivityEvent, category: &str, since: DateTime<Utc>) {
        let elapsed_ms = (Utc::now() - since).num_milliseconds().max(0);
        tracing::info!(
            target: "metrics",
            metric = "activities_duration_ms",
            context = event.as_str(),
            category,
            value = elapsed_ms
        );
    }
}

/// A single captured emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricRecord {
    Count {
        event: ActivityEvent,
        category: String,
    },
    Duration {
        event: ActivityEvent,
        category: String,
        since: DateTime<Utc>,
    },
}

/// Captures emissions in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<MetricRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All emissions so far, in arrival order.
    pub fn records(&self) -> Vec<MetricRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `count` emissions for `event` in `category`.
    pub fn count_of(&self, event: ActivityEvent, category: &str) -> usize {
        self.records()
            .iter()
            .filter(|record| {
                matches!(record, MetricRecord::Count { event: e, category: c } if *e == event && c == category)
            })
            .count()
    }

    fn push(&self, record: MetricRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl MetricsSink for RecordingSink {
    fn count(&self, event: ActivityEvent, category: &str) {
        self.push(MetricRecord::Count {
            event,
            category: category.to_string(),
        });
    }

    fn duration_observed(&self, event: ActivityEvent, category: &str, since: DateTime<Utc>) {
        self.push(MetricRecord::Duration {
            event,
            category: category.to_string(),
            since,
        });
    }
}
