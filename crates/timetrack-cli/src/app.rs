//! Wiring between configuration, storage and the engine.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, Local, Utc};

use timetrack_core::{ActivityEngine, CategoryCache, CategoryId, Clock, EngineError, TracingSink};
use timetrack_db::{Database, SqliteStore};

use crate::Config;

/// A ready-to-use engine over the configured database.
#[derive(Debug)]
pub struct App {
    engine: ActivityEngine,
    store: SqliteStore,
    request_timeout: Duration,
}

impl App {
    /// Opens the configured database, ensuring its parent directory exists.
    pub async fn open(config: &Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create database directory")?;
        }
        let db = Database::open(&config.database_path).with_context(|| {
            format!("failed to open {}", config.database_path.display())
        })?;
        Self::from_database(db, config).await
    }

    /// Builds the engine over an already-open database.
    ///
    /// Fails if the category cache cannot be loaded.
    pub async fn from_database(mut db: Database, config: &Config) -> Result<Self> {
        if config.seed_categories {
            db.seed_default_categories()
                .context("failed to seed default categories")?;
        }
        let engine_config = config.engine_config()?;

        let store = SqliteStore::new(db);
        let cache = CategoryCache::load(Arc::new(store.clone()))
            .await
            .context("failed to load categories")?;

        let engine = ActivityEngine::new(
            Arc::new(store.clone()),
            Arc::new(cache),
            Arc::new(TracingSink),
        )
        .with_config(engine_config);

        Ok(Self {
            engine,
            store,
            request_timeout: config.request_timeout(),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.engine = self.engine.with_clock(clock);
        self
    }

    pub const fn engine(&self) -> &ActivityEngine {
        &self.engine
    }

    pub const fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Runs one engine call under the request timeout.
    pub async fn call<T, F>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        tokio::time::timeout(self.request_timeout, future)
            .await
            .map_err(|_| {
                anyhow!(
                    "{operation} timed out after {}ms",
                    self.request_timeout.as_millis()
                )
            })?
            .with_context(|| format!("failed to {operation}"))
    }

    /// Category name for display, or `#id` if it cannot be resolved.
    pub async fn category_name(&self, id: CategoryId) -> String {
        match self.engine.categories().get(id).await {
            Ok(category) => category.name,
            Err(err) => {
                tracing::debug!(category_id = %id, error = %err, "category lookup failed");
                format!("#{id}")
            }
        }
    }

    /// Converts an instant to the configured offset, or local time.
    pub fn localize(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self.engine.config().utc_offset {
            Some(offset) => at.with_timezone(&offset),
            None => at.with_timezone(&Local).fixed_offset(),
        }
    }

    /// Lets background work finish within the request timeout, then cancels
    /// whatever is left.
    pub async fn shutdown(&self) {
        if tokio::time::timeout(self.request_timeout, self.engine.settle())
            .await
            .is_err()
        {
            tracing::warn!("background work still running at exit; cancelling");
        }
        self.engine.shutdown().await;
    }
}
