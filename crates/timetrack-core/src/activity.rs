//! Activities and the categories they are filed under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ActivityId, ActivityStatus, CategoryId};

/// A static label used to classify activities.
///
/// Categories are reference data: they are seeded out-of-band and never
/// mutated through the lifecycle engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tracked unit of time-boxed work tied to a category.
///
/// `finished_at` is present if and only if `status` is [`ActivityStatus::Finished`],
/// and when present it is never earlier than `started_at`. The mutators on this
/// type are the only way the engine changes lifecycle fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    /// Assigned by the store on creation.
    pub id: ActivityId,
    pub category_id: CategoryId,
    #[serde(default)]
    pub description: String,
    pub status: ActivityStatus,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// An activity that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub category_id: CategoryId,
    pub description: String,
    pub started_at: DateTime<Utc>,
}

impl NewActivity {
    /// Creates an activity starting at `started_at`.
    pub fn new(
        category_id: CategoryId,
        description: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            category_id,
            description: description.into(),
            started_at,
        }
    }

    /// Attaches the store-assigned ID, producing a `Started` activity.
    pub fn into_activity(self, id: ActivityId) -> Activity {
        Activity {
            id,
            category_id: self.category_id,
            description: self.description,
            status: ActivityStatus::Started,
            started_at: self.started_at,
            updated_at: self.started_at,
            finished_at: None,
        }
    }
}

impl Activity {
    pub const fn is_finished(&self) -> bool {
        matches!(self.status, ActivityStatus::Finished)
    }

    /// Moves the activity to `Finished` at `at`.
    ///
    /// The finish time is clamped to `started_at` so a skewed clock cannot
    /// produce a negative duration.
    pub fn finish(&mut self, at: DateTime<Utc>) {
        let at = at.max(self.started_at);
        self.status = ActivityStatus::Finished;
        self.finished_at = Some(at);
        self.updated_at = at;
    }

    /// Replaces category and description; lifecycle fields are untouched.
    pub fn amend(&mut self, category_id: CategoryId, description: String, at: DateTime<Utc>) {
        self.category_id = category_id;
        self.description = description;
        self.updated_at = at.max(self.started_at);
    }

    /// Elapsed time between start and finish, if finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }
}
