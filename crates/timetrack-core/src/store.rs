//! Collaborator interfaces consumed by the engine.
//!
//! Stores are async so a backend may suspend on I/O. Every method is a single
//! logical read or write; no multi-row transactions are required. Writes to
//! an existing activity are column-scoped: a plain update and a finish never
//! overwrite each other's fields. Dropping a
//! returned future cancels the call from the caller's point of view, but a
//! write that already reached the backend stays applied.

use std::error::Error as StdError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::activity::{Activity, Category, NewActivity};
use crate::period::Order;
use crate::types::{ActivityId, ActivityStatus, CategoryId};

/// Which kind of record a store error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Activity,
    Category,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Activity => "activity",
            Self::Category => "category",
        })
    }
}

/// Errors reported by store collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    /// A write referenced a record that does not exist (e.g. an unknown category).
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// The store could not run the operation at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl StoreError {
    /// Wraps an arbitrary backend error.
    pub fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Persistence for activities.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Persists a new activity and returns it with its assigned ID.
    async fn create(&self, activity: NewActivity) -> Result<Activity, StoreError>;

    async fn get(&self, id: ActivityId) -> Result<Activity, StoreError>;

    async fn get_all(&self) -> Result<Vec<Activity>, StoreError>;

    async fn get_by_status(&self, status: ActivityStatus) -> Result<Vec<Activity>, StoreError>;

    /// Writes category, description and `updated_at` and returns the stored
    /// row. Status, `started_at` and `finished_at` are left as stored, so a
    /// stale snapshot can never reopen a finished activity.
    async fn update(&self, activity: &Activity) -> Result<Activity, StoreError>;

    /// Finishes the activity at `at` if it is still `Started`.
    ///
    /// Returns `None` when it was already finished; the stored `finished_at`
    /// is kept. The finish time is never earlier than `started_at`.
    async fn finish(
        &self,
        id: ActivityId,
        at: DateTime<Utc>,
    ) -> Result<Option<Activity>, StoreError>;

    /// Removes the activity and returns the number of rows removed.
    async fn delete(&self, id: ActivityId) -> Result<u64, StoreError>;

    /// Activities whose `started_at` lies within `[start, end]`, ordered by
    /// `started_at` in `order`, at most `limit` of them.
    async fn filter_by_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        order: Order,
        limit: u32,
    ) -> Result<Vec<Activity>, StoreError>;
}

/// Read-only access to categories.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn get(&self, id: CategoryId) -> Result<Category, StoreError>;

    async fn get_all(&self) -> Result<Vec<Category>, StoreError>;
}

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}
