//! Async store adapter over [`Database`].

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use timetrack_core::{
    Activity, ActivityId, ActivityStatus, ActivityStore, Category, CategoryId, CategoryStore,
    NewActivity, Order, StoreError,
};

use crate::{Database, DbError};

/// Implements the engine's store traits on top of a single SQLite connection.
///
/// Calls are serialized through a mutex and run on tokio's blocking pool, so
/// a slow query never stalls the async workers.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Runs `f` against the connection on the blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T, DbError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut guard = db.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        })
        .await
        .map_err(|err| StoreError::Unavailable(format!("database task failed: {err}")))?
        .map_err(StoreError::from)
    }
}

#[async_trait]
impl ActivityStore for SqliteStore {
    async fn create(&self, activity: NewActivity) -> Result<Activity, StoreError> {
        self.with_db(move |db| db.insert_activity(&activity)).await
    }

    async fn get(&self, id: ActivityId) -> Result<Activity, StoreError> {
        self.with_db(move |db| db.get_activity(id.get())).await
    }

    async fn get_all(&self) -> Result<Vec<Activity>, StoreError> {
        self.with_db(|db| db.list_activities()).await
    }

    async fn get_by_status(&self, status: ActivityStatus) -> Result<Vec<Activity>, StoreError> {
        self.with_db(move |db| db.list_activities_by_status(status))
            .await
    }

    async fn update(&self, activity: &Activity) -> Result<Activity, StoreError> {
        let activity = activity.clone();
        self.with_db(move |db| db.update_activity(&activity)).await
    }

    async fn finish(
        &self,
        id: ActivityId,
        at: DateTime<Utc>,
    ) -> Result<Option<Activity>, StoreError> {
        self.with_db(move |db| db.finish_activity(id.get(), at)).await
    }

    async fn delete(&self, id: ActivityId) -> Result<u64, StoreError> {
        self.with_db(move |db| db.delete_activity(id.get())).await
    }

    async fn filter_by_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        order: Order,
        limit: u32,
    ) -> Result<Vec<Activity>, StoreError> {
        self.with_db(move |db| db.activities_started_between(start, end, order, limit))
            .await
    }
}

#[async_trait]
impl CategoryStore for SqliteStore {
    async fn get(&self, id: CategoryId) -> Result<Category, StoreError> {
        self.with_db(move |db| db.get_category(id.get())).await
    }

    async fn get_all(&self) -> Result<Vec<Category>, StoreError> {
        self.with_db(|db| db.list_categories()).await
    }
}
