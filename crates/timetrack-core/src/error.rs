//! Caller-facing errors.

use thiserror::Error;

use crate::store::{Entity, StoreError};
use crate::types::InputError;

/// Errors returned by the lifecycle engine and the category cache.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The referenced activity or category does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    /// Malformed period, order, range or reference.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// The store failed while running `operation`.
    #[error("{operation} failed: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// The category cache could not be loaded; the process cannot serve requests.
    #[error("failed to load categories at startup: {0}")]
    Startup(#[source] StoreError),
}

impl EngineError {
    /// Maps a store error on the synchronous path, keeping not-found distinct.
    pub(crate) fn from_store(operation: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            source => Self::Storage { operation, source },
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_lifted() {
        let err = EngineError::from_store(
            "get activity",
            StoreError::NotFound {
                entity: Entity::Activity,
                id: 9,
            },
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "activity 9 not found");
    }

    #[test]
    fn test_storage_error_keeps_operation_context() {
        let err = EngineError::from_store(
            "start activity",
            StoreError::Unavailable("pool closed".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "start activity failed: store unavailable: pool closed"
        );
    }
}
