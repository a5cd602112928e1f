//! Activity lifecycle engine.
//!
//! The engine is the only writer of activity state. Starting an activity
//! reconciles every activity that was still `Started` when the start began:
//! those are finished by a background task so the caller never waits on them.
//! Metrics are emitted from background tasks as well, labeled by category
//! name resolved through the [`CategoryCache`].
//!
//! # Background work
//!
//! Background tasks are tracked by a [`TaskTracker`] and cancelled by a
//! [`CancellationToken`] on [`ActivityEngine::shutdown`]. Each store call made
//! during reconciliation is bounded by [`EngineConfig::reconcile_timeout`].
//! Failures are logged with the activity ID and never reach the caller; a
//! failed reconciliation leaves the stale activity `Started` until a later
//! start picks it up again.
//!
//! # Cancellation
//!
//! Every operation is a plain future. Dropping it (for example when a request
//! times out) stops the operation at its next await point. Each operation
//! performs at most one write, so cancellation never leaves a half-applied
//! change; a start whose row was already created stays created.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, Utc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::activity::{Activity, NewActivity};
use crate::cache::CategoryCache;
use crate::error::EngineError;
use crate::metrics::{ActivityEvent, MetricsSink};
use crate::period::{self, DEFAULT_LIMIT, PeriodFilter, PeriodQuery};
use crate::store::{ActivityStore, Clock, StoreError, SystemClock};
use crate::types::{ActivityId, ActivityStatus, CategoryId, InputError};

/// Default bound on each background reconciliation call.
pub const DEFAULT_RECONCILE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Result cap used when a period filter carries no usable limit.
    pub default_limit: u32,
    /// Upper bound on each store call made while reconciling.
    pub reconcile_timeout: Duration,
    /// Offset used for period boundaries; `None` uses the system's local zone.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            reconcile_timeout: DEFAULT_RECONCILE_TIMEOUT,
            utc_offset: None,
        }
    }
}

/// Activities matching a period filter together with the resolved query.
#[derive(Debug, Clone)]
pub struct PeriodActivities {
    pub activities: Vec<Activity>,
    /// The bounds, order and limit actually used, plus any warnings.
    pub query: PeriodQuery,
}

/// Owns activity state transitions.
///
/// Cloning is cheap and clones share stores, cache and background tasks.
#[derive(Clone)]
pub struct ActivityEngine {
    activities: Arc<dyn ActivityStore>,
    categories: Arc<CategoryCache>,
    metrics: Arc<dyn MetricsSink>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    tasks: TaskTracker,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ActivityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityEngine")
            .field("categories", &self.categories)
            .field("config", &self.config)
            .field("pending_tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl ActivityEngine {
    pub fn new(
        activities: Arc<dyn ActivityStore>,
        categories: Arc<CategoryCache>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            activities,
            categories,
            metrics,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
            tasks: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn categories(&self) -> &CategoryCache {
        &self.categories
    }

    /// Starts a new activity and reconciles every previously open one.
    ///
    /// The open set is snapshotted before the new activity is created; those
    /// activities are finished in the background after creation succeeds.
    /// An activity started concurrently by another caller may be missed and
    /// is left for a later start.
    pub async fn start_activity(
        &self,
        category_id: CategoryId,
        description: impl Into<String>,
    ) -> Result<Activity, EngineError> {
        let open = self
            .activities
            .get_by_status(ActivityStatus::Started)
            .await
            .map_err(|err| EngineError::from_store("scan open activities", err))?;

        let new_activity = NewActivity::new(category_id, description, self.clock.now());
        let activity = self
            .activities
            .create(new_activity)
            .await
            .map_err(|err| write_error("start activity", category_id, err))?;

        info!(activity_id = %activity.id, category_id = %category_id, "activity started");

        if !open.is_empty() {
            debug!(
                activity_id = %activity.id,
                open = open.len(),
                "reconciling open activities"
            );
            let engine = self.clone();
            self.spawn(async move { engine.reconcile(open).await });
        }
        self.emit(ActivityEvent::Started, &activity, None);

        Ok(activity)
    }

    /// Finishes an activity.
    ///
    /// Finishing an activity that is already finished returns it unchanged
    /// and emits nothing; `finished_at` is written exactly once.
    pub async fn finish_activity(&self, id: ActivityId) -> Result<Activity, EngineError> {
        let activity = self
            .activities
            .get(id)
            .await
            .map_err(|err| EngineError::from_store("finish activity", err))?;

        if activity.is_finished() {
            debug!(activity_id = %id, "activity already finished");
            return Ok(activity);
        }

        let finished = self
            .activities
            .finish(id, self.clock.now())
            .await
            .map_err(|err| EngineError::from_store("finish activity", err))?;

        match finished {
            Some(activity) => {
                info!(activity_id = %id, "activity finished");
                self.emit(ActivityEvent::Finished, &activity, Some(activity.started_at));
                Ok(activity)
            }
            None => {
                debug!(activity_id = %id, "activity finished concurrently");
                self.activities
                    .get(id)
                    .await
                    .map_err(|err| EngineError::from_store("finish activity", err))
            }
        }
    }

    /// Replaces category and description; status and timestamps other than
    /// `updated_at` are left alone, even if the activity is finished while
    /// the update is in flight.
    pub async fn update_activity(
        &self,
        id: ActivityId,
        category_id: CategoryId,
        description: impl Into<String>,
    ) -> Result<Activity, EngineError> {
        let mut activity = self
            .activities
            .get(id)
            .await
            .map_err(|err| EngineError::from_store("update activity", err))?;

        activity.amend(category_id, description.into(), self.clock.now());
        let activity = self
            .activities
            .update(&activity)
            .await
            .map_err(|err| write_error("update activity", category_id, err))?;

        info!(activity_id = %id, category_id = %category_id, "activity updated");
        self.emit(ActivityEvent::Updated, &activity, None);
        Ok(activity)
    }

    /// Deletes an activity.
    ///
    /// A missing activity is reported as not found. If the row disappears
    /// between the lookup and the delete, the delete is a silent no-op.
    pub async fn delete_activity(&self, id: ActivityId) -> Result<(), EngineError> {
        let activity = self
            .activities
            .get(id)
            .await
            .map_err(|err| EngineError::from_store("delete activity", err))?;

        let removed = self
            .activities
            .delete(id)
            .await
            .map_err(|err| EngineError::from_store("delete activity", err))?;

        if removed > 0 {
            info!(activity_id = %id, "activity deleted");
            self.emit(ActivityEvent::Deleted, &activity, None);
        } else {
            debug!(activity_id = %id, "activity already removed");
        }
        Ok(())
    }

    pub async fn get_activity(&self, id: ActivityId) -> Result<Activity, EngineError> {
        self.activities
            .get(id)
            .await
            .map_err(|err| EngineError::from_store("get activity", err))
    }

    pub async fn get_activities(&self) -> Result<Vec<Activity>, EngineError> {
        self.activities
            .get_all()
            .await
            .map_err(|err| EngineError::from_store("list activities", err))
    }

    /// Activities started within the filter's period.
    ///
    /// Resolver warnings are logged and returned with the result.
    pub async fn filter_activities_by_period(
        &self,
        filter: &PeriodFilter,
    ) -> Result<PeriodActivities, EngineError> {
        let now = self.clock.now();
        let query = match self.config.utc_offset {
            Some(offset) => {
                period::resolve(filter, &now.with_timezone(&offset), self.config.default_limit)
            }
            None => period::resolve(filter, &now.with_timezone(&Local), self.config.default_limit),
        }?;
        for warning in &query.warnings {
            warn!(%warning, "period filter adjusted");
        }

        let activities = self
            .activities
            .filter_by_period(query.start, query.end, query.order, query.limit)
            .await
            .map_err(|err| EngineError::from_store("filter activities", err))?;

        debug!(
            start = %query.start,
            end = %query.end,
            order = %query.order,
            limit = query.limit,
            found = activities.len(),
            "period filter resolved"
        );
        Ok(PeriodActivities { activities, query })
    }

    /// Waits until every background task spawned so far has finished.
    pub async fn settle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Cancels pending background work and waits for it to stop.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tasks.close();
        self.tasks.wait().await;
        debug!("activity engine stopped");
    }

    async fn reconcile(&self, open: Vec<Activity>) {
        for stale in open {
            let id = stale.id;
            match tokio::time::timeout(self.config.reconcile_timeout, self.finish_open(id)).await
            {
                Ok(Ok(Some(_))) => debug!(activity_id = %id, "open activity reconciled"),
                Ok(Ok(None)) => debug!(activity_id = %id, "open activity already closed"),
                Ok(Err(err)) => warn!(
                    activity_id = %id,
                    operation = "reconcile",
                    error = %err,
                    "unable to finish open activity"
                ),
                Err(_) => warn!(
                    activity_id = %id,
                    operation = "reconcile",
                    timeout_ms = u64::try_from(self.config.reconcile_timeout.as_millis()).unwrap_or(u64::MAX),
                    "timed out finishing open activity"
                ),
            }
        }
    }

    /// Finishes `id` if it is still open. A concurrent finish or delete wins
    /// and nothing is emitted.
    async fn finish_open(&self, id: ActivityId) -> Result<Option<Activity>, StoreError> {
        let finished = match self.activities.finish(id, self.clock.now()).await {
            Ok(finished) => finished,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        if let Some(activity) = &finished {
            self.emit(ActivityEvent::Finished, activity, Some(activity.started_at));
        }
        Ok(finished)
    }

    /// Reports `event` for `activity` from a background task.
    fn emit(&self, event: ActivityEvent, activity: &Activity, since: Option<DateTime<Utc>>) {
        let categories = Arc::clone(&self.categories);
        let metrics = Arc::clone(&self.metrics);
        let activity_id = activity.id;
        let category_id = activity.category_id;
        self.spawn(async move {
            match categories.get(category_id).await {
                Ok(category) => {
                    metrics.count(event, &category.name);
                    if let Some(since) = since {
                        metrics.duration_observed(event, &category.name, since);
                    }
                }
                Err(err) => warn!(
                    activity_id = %activity_id,
                    category_id = %category_id,
                    operation = event.as_str(),
                    error = %err,
                    "unable to resolve category for metrics"
                ),
            }
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => debug!("background task cancelled"),
                () = task => {}
            }
        });
    }
}

/// Maps a write failure, turning a rejected category reference into input error.
fn write_error(operation: &'static str, category_id: CategoryId, err: StoreError) -> EngineError {
    match err {
        StoreError::InvalidReference(_) => EngineError::InvalidInput(InputError::UnknownCategory {
            id: category_id.get(),
        }),
        err => EngineError::from_store(operation, err),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone};

    use super::*;
    use crate::memory::{MemoryActivityStore, MemoryCategoryStore};
    use crate::metrics::{MetricRecord, RecordingSink};
    use crate::store::ManualClock;

    struct Harness {
        engine: ActivityEngine,
        activities: Arc<MemoryActivityStore>,
        categories: Arc<MemoryCategoryStore>,
        metrics: Arc<RecordingSink>,
        clock: Arc<ManualClock>,
    }

    async fn harness() -> Harness {
        let categories = Arc::new(MemoryCategoryStore::new());
        categories.insert("Work", "");
        categories.insert("Break", "");
        let activities = Arc::new(MemoryActivityStore::with_categories(categories.clone()));
        let metrics = Arc::new(RecordingSink::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(),
        ));
        let cache = Arc::new(CategoryCache::load(categories.clone()).await.unwrap());
        let engine = ActivityEngine::new(activities.clone(), cache, metrics.clone())
            .with_clock(clock.clone())
            .with_config(EngineConfig {
                utc_offset: FixedOffset::east_opt(0),
                ..EngineConfig::default()
            });
        Harness {
            engine,
            activities,
            categories,
            metrics,
            clock,
        }
    }

    fn work() -> CategoryId {
        CategoryId::new(1).unwrap()
    }

    fn brk() -> CategoryId {
        CategoryId::new(2).unwrap()
    }

    #[tokio::test]
    async fn start_creates_started_activity() {
        let h = harness().await;
        let activity = h.engine.start_activity(work(), "coding").await.unwrap();

        assert_eq!(activity.status, ActivityStatus::Started);
        assert_eq!(activity.started_at, h.clock.now());
        assert_eq!(activity.updated_at, h.clock.now());
        assert!(activity.finished_at.is_none());

        h.engine.settle().await;
        assert_eq!(h.metrics.count_of(ActivityEvent::Started, "Work"), 1);
    }

    #[tokio::test]
    async fn start_reconciles_every_open_activity() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        // Leftovers from a previous session, opened without reconciliation.
        for i in 0..3 {
            h.activities.insert(
                NewActivity::new(brk(), format!("stale {i}"), h.clock.now())
                    .into_activity(ActivityId::new(100 + i).unwrap()),
            );
        }
        h.engine.settle().await;

        h.clock.advance(ChronoDuration::minutes(5));
        let reconciled_at = h.clock.now();
        let b = h.engine.start_activity(work(), "b").await.unwrap();
        h.engine.settle().await;

        for id in [a.id.get(), 100, 101, 102] {
            let row = h.activities.peek(ActivityId::new(id).unwrap()).unwrap();
            assert_eq!(row.status, ActivityStatus::Finished, "activity {id}");
            assert_eq!(row.finished_at, Some(reconciled_at));
            assert_eq!(row.updated_at, reconciled_at);
            assert!(row.finished_at.unwrap() >= row.started_at);
        }
        let b = h.activities.peek(b.id).unwrap();
        assert_eq!(b.status, ActivityStatus::Started);
        assert_eq!(h.metrics.count_of(ActivityEvent::Finished, "Work"), 1);
        assert_eq!(h.metrics.count_of(ActivityEvent::Finished, "Break"), 3);
    }

    #[tokio::test]
    async fn reconciliation_failure_does_not_fail_start() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        h.engine.settle().await;

        h.activities.fail_updates(true);
        let b = h.engine.start_activity(brk(), "b").await.unwrap();
        h.engine.settle().await;

        assert_eq!(b.status, ActivityStatus::Started);
        let a = h.activities.peek(a.id).unwrap();
        assert_eq!(a.status, ActivityStatus::Started);

        // A later start picks the stale activity up again.
        h.activities.fail_updates(false);
        h.engine.start_activity(work(), "c").await.unwrap();
        h.engine.settle().await;
        assert!(h.activities.peek(a.id).unwrap().is_finished());
        assert!(h.activities.peek(b.id).unwrap().is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reconciliation_is_bounded() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        h.engine.settle().await;

        h.activities.delay_updates(Some(Duration::from_secs(60)));
        h.engine.start_activity(work(), "b").await.unwrap();
        h.engine.settle().await;

        assert_eq!(h.activities.update_calls(), 1);
        assert_eq!(
            h.activities.peek(a.id).unwrap().status,
            ActivityStatus::Started
        );
    }

    #[tokio::test(start_paused = true)]
    async fn update_during_reconciliation_keeps_activity_finished() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        h.engine.settle().await;

        h.activities.delay_updates(Some(Duration::from_millis(100)));
        h.engine.start_activity(work(), "b").await.unwrap();
        // Let reconciliation reach its delayed finish of `a`.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(50)).await;

        let updated = h
            .engine
            .update_activity(a.id, brk(), "renamed")
            .await
            .unwrap();
        h.engine.settle().await;

        let stored = h.activities.peek(a.id).unwrap();
        assert_eq!(updated.status, ActivityStatus::Finished);
        assert_eq!(stored.status, ActivityStatus::Finished);
        assert!(stored.finished_at.is_some());
        assert_eq!(stored.category_id, brk());
        assert_eq!(stored.description, "renamed");
        assert_eq!(h.metrics.count_of(ActivityEvent::Finished, "Work"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reconciliation_does_not_undo_a_concurrent_update() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        h.engine.settle().await;

        // The update lands first, the reconciling finish 50ms later.
        h.activities.delay_updates(Some(Duration::from_millis(100)));
        let engine = h.engine.clone();
        let update = tokio::spawn(async move {
            engine.update_activity(a.id, brk(), "renamed").await
        });
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(50)).await;
        h.engine.start_activity(work(), "b").await.unwrap();

        update.await.unwrap().unwrap();
        h.engine.settle().await;

        let stored = h.activities.peek(a.id).unwrap();
        assert_eq!(stored.status, ActivityStatus::Finished);
        assert_eq!(stored.category_id, brk());
        assert_eq!(stored.description, "renamed");
    }

    #[tokio::test]
    async fn scan_failure_fails_start() {
        let h = harness().await;
        h.activities.fail_status_scan(true);

        let err = h.engine.start_activity(work(), "a").await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Storage {
                operation: "scan open activities",
                ..
            }
        ));
        assert!(h.activities.is_empty());
    }

    #[tokio::test]
    async fn unknown_category_is_invalid_input() {
        let h = harness().await;
        let err = h
            .engine
            .start_activity(CategoryId::new(99).unwrap(), "x")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidInput(InputError::UnknownCategory { id: 99 })
        ));
    }

    #[tokio::test]
    async fn category_lookup_failure_is_swallowed() {
        let h = harness().await;
        // Seeded after the cache was loaded, and the store now refuses reads.
        let extra = h.categories.insert("Study", "");
        h.categories.fail_reads(true);

        let activity = h.engine.start_activity(extra.id, "reading").await.unwrap();
        h.engine.settle().await;

        assert_eq!(activity.category_id, extra.id);
        assert!(h.metrics.records().is_empty());
    }

    #[tokio::test]
    async fn finish_records_duration_since_start() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        h.clock.advance(ChronoDuration::minutes(30));

        let finished = h.engine.finish_activity(a.id).await.unwrap();
        h.engine.settle().await;

        assert_eq!(finished.status, ActivityStatus::Finished);
        assert_eq!(finished.finished_at, Some(h.clock.now()));
        assert_eq!(finished.duration(), Some(ChronoDuration::minutes(30)));
        assert!(h.metrics.records().contains(&MetricRecord::Duration {
            event: ActivityEvent::Finished,
            category: "Work".to_string(),
            since: a.started_at,
        }));
    }

    #[tokio::test]
    async fn finish_twice_keeps_first_finish_time() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        let first = h.engine.finish_activity(a.id).await.unwrap();

        h.clock.advance(ChronoDuration::minutes(10));
        let second = h.engine.finish_activity(a.id).await.unwrap();
        h.engine.settle().await;

        assert_eq!(first.finished_at, second.finished_at);
        assert_eq!(h.activities.update_calls(), 1);
        assert_eq!(h.metrics.count_of(ActivityEvent::Finished, "Work"), 1);
    }

    #[tokio::test]
    async fn finish_unknown_is_not_found() {
        let h = harness().await;
        let err = h
            .engine
            .finish_activity(ActivityId::new(5).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_touches_only_category_and_description() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        let finished = h.engine.finish_activity(a.id).await.unwrap();
        h.clock.advance(ChronoDuration::minutes(1));

        let updated = h
            .engine
            .update_activity(a.id, brk(), "coffee")
            .await
            .unwrap();
        h.engine.settle().await;

        assert_eq!(updated.category_id, brk());
        assert_eq!(updated.description, "coffee");
        assert_eq!(updated.status, ActivityStatus::Finished);
        assert_eq!(updated.started_at, finished.started_at);
        assert_eq!(updated.finished_at, finished.finished_at);
        assert_eq!(updated.updated_at, h.clock.now());
        assert_eq!(h.metrics.count_of(ActivityEvent::Updated, "Break"), 1);
    }

    #[tokio::test]
    async fn delete_removes_and_reports() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        h.engine.delete_activity(a.id).await.unwrap();
        h.engine.settle().await;

        assert!(h.activities.peek(a.id).is_none());
        assert_eq!(h.metrics.count_of(ActivityEvent::Deleted, "Work"), 1);
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let h = harness().await;
        let err = h
            .engine
            .delete_activity(ActivityId::new(77).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { id: 77, .. }));
    }

    #[tokio::test]
    async fn write_failure_is_storage_error() {
        let h = harness().await;
        h.activities.fail_writes(true);
        let err = h.engine.start_activity(work(), "a").await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Storage {
                operation: "start activity",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn filter_with_zero_limit_warns() {
        let h = harness().await;
        h.engine.start_activity(work(), "a").await.unwrap();

        let result = h
            .engine
            .filter_activities_by_period(&PeriodFilter::named("today").limit(0))
            .await
            .unwrap();

        assert_eq!(result.activities.len(), 1);
        assert_eq!(result.query.limit, DEFAULT_LIMIT);
        assert_eq!(result.query.warnings.len(), 1);
    }

    #[tokio::test]
    async fn filter_rejects_bad_period() {
        let h = harness().await;
        let err = h
            .engine
            .filter_activities_by_period(&PeriodFilter::named("someday"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidInput(InputError::InvalidPeriod { .. })
        ));
    }

    #[tokio::test]
    async fn shutdown_cancels_pending_reconciliation() {
        let h = harness().await;
        let a = h.engine.start_activity(work(), "a").await.unwrap();
        h.engine.settle().await;

        h.activities.delay_updates(Some(Duration::from_millis(200)));
        h.engine.start_activity(work(), "b").await.unwrap();
        h.engine.shutdown().await;

        assert_eq!(
            h.activities.peek(a.id).unwrap().status,
            ActivityStatus::Started
        );
    }
}
