//! Core domain logic for timetrack.
//!
//! This crate contains:
//! - Activity lifecycle: start, finish, update and delete, with background
//!   reconciliation of activities left open
//! - Category cache: a concurrent read-through cache over the category store
//! - Period resolution: named or explicit windows turned into bounded queries

pub mod activity;
pub mod cache;
pub mod engine;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod period;
pub mod store;
pub mod types;

pub use activity::{Activity, Category, NewActivity};
pub use cache::CategoryCache;
pub use engine::{ActivityEngine, EngineConfig, PeriodActivities};
pub use error::EngineError;
pub use metrics::{ActivityEvent, MetricsSink, TracingSink};
pub use period::{DEFAULT_LIMIT, Order, Period, PeriodFilter, PeriodQuery, QueryWarning};
pub use store::{ActivityStore, CategoryStore, Clock, Entity, StoreError, SystemClock};
pub use types::{ActivityId, ActivityStatus, CategoryId, InputError};
