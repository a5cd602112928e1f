//! Read-through cache over the category store.
//!
//! # Concurrency
//!
//! The map sits behind a [`RwLock`]. Lookups take the read lock and never hold
//! it across an await; a miss goes to the store with no lock held, and only
//! the insertion of the fetched category takes the write lock. Entries are
//! never evicted, so memory is bounded by the number of distinct categories.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::activity::Category;
use crate::error::EngineError;
use crate::store::{CategoryStore, StoreError};
use crate::types::CategoryId;

/// Concurrent read-through category cache.
///
/// Constructed once at startup with [`CategoryCache::load`] and shared by
/// reference (usually behind an `Arc`) for the life of the process.
pub struct CategoryCache {
    store: Arc<dyn CategoryStore>,
    entries: RwLock<HashMap<CategoryId, Category>>,
}

impl std::fmt::Debug for CategoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryCache")
            .field("cached", &self.len())
            .finish_non_exhaustive()
    }
}

impl CategoryCache {
    /// Eagerly fetches every category from `store`.
    ///
    /// A failure here is fatal for the caller: without a category set the
    /// process cannot label or validate anything.
    pub async fn load(store: Arc<dyn CategoryStore>) -> Result<Self, EngineError> {
        let categories = store.get_all().await.map_err(EngineError::Startup)?;
        let entries: HashMap<_, _> = categories
            .into_iter()
            .map(|category| (category.id, category))
            .collect();
        info!(categories = entries.len(), "category cache loaded");
        Ok(Self {
            store,
            entries: RwLock::new(entries),
        })
    }

    /// Returns the category, consulting the store only on a miss.
    ///
    /// A store failure is returned as-is and leaves the cache untouched.
    pub async fn get(&self, id: CategoryId) -> Result<Category, StoreError> {
        if let Some(category) = self.cached(id) {
            return Ok(category);
        }

        debug!(category_id = %id, "category cache miss");
        let category = self.store.get(id).await?;
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category.id, category.clone());
        Ok(category)
    }

    /// Lists categories straight from the store, bypassing the cache.
    pub async fn get_all(&self) -> Result<Vec<Category>, StoreError> {
        self.store.get_all().await
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, id: CategoryId) -> Option<Category> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}
