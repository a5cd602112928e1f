//! In-memory store implementations.
//!
//! Useful for tests and for embedding the engine without a database. Both
//! stores count calls and can be told to fail, so callers can assert on cache
//! behavior and error paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::activity::{Activity, Category, NewActivity};
use crate::period::Order;
use crate::store::{ActivityStore, CategoryStore, Entity, StoreError};
use crate::types::{ActivityId, ActivityStatus, CategoryId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(what: &str) -> StoreError {
    StoreError::Unavailable(format!("injected {what} failure"))
}

/// Category store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryCategoryStore {
    rows: Mutex<BTreeMap<CategoryId, Category>>,
    get_calls: AtomicUsize,
    get_all_calls: AtomicUsize,
    fail_reads: AtomicBool,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a category with the next free ID.
    pub fn insert(&self, name: &str, description: &str) -> Category {
        let mut rows = lock(&self.rows);
        let id = rows
            .keys()
            .next_back()
            .map_or(CategoryId::FIRST, |last| last.next());
        let now = Utc::now();
        let category = Category {
            id,
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        };
        rows.insert(category.id, category.clone());
        category
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        lock(&self.rows).contains_key(&id)
    }

    /// Makes every subsequent read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of single-category fetches served.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of full listings served.
    pub fn get_all_calls(&self) -> usize {
        self.get_all_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn get(&self, id: CategoryId) -> Result<Category, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        lock(&self.rows)
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: Entity::Category,
                id: id.get(),
            })
    }

    async fn get_all(&self) -> Result<Vec<Category>, StoreError> {
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        Ok(lock(&self.rows).values().cloned().collect())
    }
}

/// Activity store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryActivityStore {
    rows: Mutex<BTreeMap<ActivityId, Activity>>,
    next_id: AtomicUsize,
    categories: Option<Arc<MemoryCategoryStore>>,
    update_calls: AtomicUsize,
    update_delay: Mutex<Option<Duration>>,
    fail_writes: AtomicBool,
    fail_updates: AtomicBool,
    fail_status_scan: AtomicBool,
}

impl MemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects writes that reference categories missing from `categories`.
    pub fn with_categories(categories: Arc<MemoryCategoryStore>) -> Self {
        Self {
            categories: Some(categories),
            ..Self::default()
        }
    }

    /// Stores `activity` verbatim under its own ID.
    pub fn insert(&self, activity: Activity) {
        let id = usize::try_from(activity.id.get()).unwrap_or(usize::MAX);
        self.next_id.fetch_max(id, Ordering::SeqCst);
        lock(&self.rows).insert(activity.id, activity);
    }

    /// Snapshot of a stored activity without counting as a store call.
    pub fn peek(&self, id: ActivityId) -> Option<Activity> {
        lock(&self.rows).get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes create, update and delete fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes only update and finish fail.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Makes the open-activity scan fail.
    pub fn fail_status_scan(&self, fail: bool) {
        self.fail_status_scan.store(fail, Ordering::SeqCst);
    }

    /// Delays every update and finish by `delay`.
    pub fn delay_updates(&self, delay: Option<Duration>) {
        *lock(&self.update_delay) = delay;
    }

    /// Number of update and finish calls, including failed ones.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Shared prelude of update and finish: count, delay, injected failures.
    async fn begin_row_write(&self) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.update_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_writable()?;
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(injected("update"));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected("write"));
        }
        Ok(())
    }

    fn check_category(&self, id: CategoryId) -> Result<(), StoreError> {
        match &self.categories {
            Some(categories) if !categories.contains(id) => Err(StoreError::InvalidReference(
                format!("category {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    fn not_found(id: ActivityId) -> StoreError {
        StoreError::NotFound {
            entity: Entity::Activity,
            id: id.get(),
        }
    }
}

#[async_trait]
impl ActivityStore for MemoryActivityStore {
    async fn create(&self, activity: NewActivity) -> Result<Activity, StoreError> {
        self.check_writable()?;
        self.check_category(activity.category_id)?;
        let next = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = i64::try_from(next)
            .ok()
            .and_then(|raw| ActivityId::new(raw).ok())
            .ok_or_else(|| StoreError::Unavailable("activity id space exhausted".to_string()))?;
        let activity = activity.into_activity(id);
        lock(&self.rows).insert(id, activity.clone());
        Ok(activity)
    }

    async fn get(&self, id: ActivityId) -> Result<Activity, StoreError> {
        self.peek(id).ok_or_else(|| Self::not_found(id))
    }

    async fn get_all(&self) -> Result<Vec<Activity>, StoreError> {
        Ok(lock(&self.rows).values().cloned().collect())
    }

    async fn get_by_status(&self, status: ActivityStatus) -> Result<Vec<Activity>, StoreError> {
        if self.fail_status_scan.load(Ordering::SeqCst) {
            return Err(injected("scan"));
        }
        Ok(lock(&self.rows)
            .values()
            .filter(|activity| activity.status == status)
            .cloned()
            .collect())
    }

    async fn update(&self, activity: &Activity) -> Result<Activity, StoreError> {
        self.begin_row_write().await?;
        self.check_category(activity.category_id)?;
        let mut rows = lock(&self.rows);
        let row = rows
            .get_mut(&activity.id)
            .ok_or_else(|| Self::not_found(activity.id))?;
        row.amend(
            activity.category_id,
            activity.description.clone(),
            activity.updated_at,
        );
        Ok(row.clone())
    }

    async fn finish(
        &self,
        id: ActivityId,
        at: DateTime<Utc>,
    ) -> Result<Option<Activity>, StoreError> {
        self.begin_row_write().await?;
        let mut rows = lock(&self.rows);
        let row = rows.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        if row.is_finished() {
            return Ok(None);
        }
        row.finish(at);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: ActivityId) -> Result<u64, StoreError> {
        self.check_writable()?;
        Ok(u64::from(lock(&self.rows).remove(&id).is_some()))
    }

    async fn filter_by_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        order: Order,
        limit: u32,
    ) -> Result<Vec<Activity>, StoreError> {
        let mut matching: Vec<Activity> = lock(&self.rows)
            .values()
            .filter(|activity| activity.started_at >= start && activity.started_at <= end)
            .cloned()
            .collect();
        matching.sort_by_key(|activity| (activity.started_at, activity.id));
        if order == Order::Desc {
            matching.reverse();
        }
        matching.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(matching)
    }
}
