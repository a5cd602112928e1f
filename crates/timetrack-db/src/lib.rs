//! Storage layer for timetrack.
//!
//! Provides persistence for categories and activities using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! [`SqliteStore`] puts a `Database` behind a mutex and runs every call on the
//! blocking pool, which is how the async engine talks to it.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in fixed-width RFC 3339 UTC with microsecond
//! precision (e.g. `2024-01-15T10:30:00.000000Z`). Every value has the same
//! width, so lexicographic ordering matches chronological ordering and range
//! filters can compare the text directly.
//!
//! ## Migrations
//!
//! Schema changes are named migrations recorded in the `migrations` table.
//! Each one runs at most once, inside its own transaction.

mod store;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use thiserror::Error;
use tracing::{debug, info};

use timetrack_core::{
    Activity, ActivityId, ActivityStatus, Category, CategoryId, Entity, NewActivity, Order,
    StoreError,
};

pub use store::SqliteStore;

/// Categories inserted into an empty database.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Work", "Paid or professional work"),
    ("Study", "Courses, reading and practice"),
    ("Exercise", "Workouts and sports"),
    ("Break", "Short pauses between tasks"),
    ("Leisure", "Free time"),
];

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "0001_create_categories",
        "
        CREATE TABLE categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    ),
    (
        "0002_create_activities",
        "
        -- finished_at is present exactly when status = 'finished'
        CREATE TABLE activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL CHECK (status IN ('started', 'finished')),
            started_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            finished_at TEXT,
            CHECK ((status = 'finished') = (finished_at IS NOT NULL)),
            FOREIGN KEY (category_id) REFERENCES categories(id)
        );

        CREATE INDEX idx_activities_status ON activities(status);
        CREATE INDEX idx_activities_started ON activities(started_at);
        ",
    ),
];

const ACTIVITY_COLUMNS: &str =
    "id, category_id, description, status, started_at, updated_at, finished_at";

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The requested row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {record}: {timestamp}")]
    TimestampParse {
        record: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates a domain rule.
    #[error("invalid data for {record}: {message}")]
    InvalidData { record: String, message: String },
}

impl DbError {
    fn is_foreign_key_violation(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
            }
            _ => false,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => Self::NotFound { entity, id },
            err if err.is_foreign_key_violation() => Self::InvalidReference(err.to_string()),
            err => Self::backend(err),
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish_non_exhaustive()
    }
}

/// Raw activity row as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActivityRecord {
    id: i64,
    category_id: i64,
    description: String,
    status: String,
    started_at: String,
    updated_at: String,
    finished_at: Option<String>,
}

impl ActivityRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            category_id: row.get(1)?,
            description: row.get(2)?,
            status: row.get(3)?,
            started_at: row.get(4)?,
            updated_at: row.get(5)?,
            finished_at: row.get(6)?,
        })
    }

    fn into_activity(self) -> Result<Activity, DbError> {
        let record = format!("activity {}", self.id);
        let invalid = |message: String| DbError::InvalidData {
            record: record.clone(),
            message,
        };
        let id = ActivityId::new(self.id).map_err(|err| invalid(err.to_string()))?;
        let category_id =
            CategoryId::new(self.category_id).map_err(|err| invalid(err.to_string()))?;
        let status: ActivityStatus = self
            .status
            .parse()
            .map_err(|err: timetrack_core::InputError| invalid(err.to_string()))?;
        let finished_at = self
            .finished_at
            .as_deref()
            .map(|ts| parse_timestamp(ts, &record))
            .transpose()?;
        if (status == ActivityStatus::Finished) != finished_at.is_some() {
            return Err(invalid(format!(
                "status {status} disagrees with finished_at {:?}",
                self.finished_at
            )));
        }

        Ok(Activity {
            id,
            category_id,
            description: self.description,
            status,
            started_at: parse_timestamp(&self.started_at, &record)?,
            updated_at: parse_timestamp(&self.updated_at, &record)?,
            finished_at,
        })
    }
}

/// Raw category row as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryRecord {
    id: i64,
    name: String,
    description: String,
    created_at: String,
    updated_at: String,
}

impl CategoryRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_category(self) -> Result<Category, DbError> {
        let record = format!("category {}", self.id);
        let id = CategoryId::new(self.id).map_err(|err| DbError::InvalidData {
            record: record.clone(),
            message: err.to_string(),
        })?;
        Ok(Category {
            id,
            name: self.name,
            description: self.description,
            created_at: parse_timestamp(&self.created_at, &record)?,
            updated_at: parse_timestamp(&self.updated_at, &record)?,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// Pending migrations are applied on open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
        )?;

        for (name, sql) in MIGRATIONS {
            let applied: bool = self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
                [name],
                |row| row.get(0),
            )?;
            if applied {
                continue;
            }
            let tx = self.conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.execute(
                "INSERT INTO migrations (name, applied_at) VALUES (?, ?)",
                params![name, format_timestamp(Utc::now())],
            )?;
            tx.commit()?;
            info!(migration = name, "applied migration");
        }
        Ok(())
    }

    /// Names of the migrations applied so far, in order.
    pub fn applied_migrations(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM migrations ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    // ========== Categories ==========

    /// Inserts a category. Names must be unique.
    pub fn insert_category(&self, name: &str, description: &str) -> Result<Category, DbError> {
        let now = format_timestamp(Utc::now());
        self.conn.execute(
            "INSERT INTO categories (name, description, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![name, description, now, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_category(id)
    }

    /// Inserts [`DEFAULT_CATEGORIES`] if no category exists yet.
    ///
    /// Returns the number of categories inserted.
    pub fn seed_default_categories(&mut self) -> Result<usize, DbError> {
        let existing: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        let now = format_timestamp(Utc::now());
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO categories (name, description, created_at, updated_at) VALUES (?, ?, ?, ?)",
            )?;
            for (name, description) in DEFAULT_CATEGORIES {
                inserted += stmt.execute(params![name, description, now, now])?;
            }
        }
        tx.commit()?;
        info!(inserted, "seeded default categories");
        Ok(inserted)
    }

    pub fn get_category(&self, id: i64) -> Result<Category, DbError> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"),
                [id],
                CategoryRecord::from_row,
            )
            .optional()?
            .ok_or(DbError::NotFound {
                entity: Entity::Category,
                id,
            })?;
        record.into_category()
    }

    /// Lists categories ordered by ID.
    pub fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], CategoryRecord::from_row)?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?.into_category()?);
        }
        Ok(categories)
    }

    // ========== Activities ==========

    /// Inserts a new `started` activity and returns it with its assigned ID.
    pub fn insert_activity(&self, activity: &NewActivity) -> Result<Activity, DbError> {
        let started_at = format_timestamp(activity.started_at);
        self.conn.execute(
            "
            INSERT INTO activities (category_id, description, status, started_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                activity.category_id.get(),
                activity.description,
                ActivityStatus::Started.as_str(),
                started_at,
                started_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(activity_id = id, "activity row inserted");
        self.get_activity(id)
    }

    pub fn get_activity(&self, id: i64) -> Result<Activity, DbError> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?"),
                [id],
                ActivityRecord::from_row,
            )
            .optional()?
            .ok_or(DbError::NotFound {
                entity: Entity::Activity,
                id,
            })?;
        record.into_activity()
    }

    /// Lists all activities ordered by start time then ID.
    pub fn list_activities(&self) -> Result<Vec<Activity>, DbError> {
        self.query_activities(
            &format!("SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY started_at ASC, id ASC"),
            [],
        )
    }

    /// Lists activities with the given status ordered by start time then ID.
    pub fn list_activities_by_status(
        &self,
        status: ActivityStatus,
    ) -> Result<Vec<Activity>, DbError> {
        self.query_activities(
            &format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE status = ? ORDER BY started_at ASC, id ASC"
            ),
            [status.as_str()],
        )
    }

    /// Writes category, description and `updated_at`.
    ///
    /// Status, `started_at` and `finished_at` are never rewritten here, so a
    /// stale snapshot cannot reopen a finished row.
    pub fn update_activity(&self, activity: &Activity) -> Result<Activity, DbError> {
        let changed = self.conn.execute(
            "
            UPDATE activities
            SET category_id = ?, description = ?, updated_at = ?
            WHERE id = ?
            ",
            params![
                activity.category_id.get(),
                activity.description,
                format_timestamp(activity.updated_at),
                activity.id.get(),
            ],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Activity,
                id: activity.id.get(),
            });
        }
        self.get_activity(activity.id.get())
    }

    /// Finishes a started activity at `at`, clamped to its `started_at`.
    ///
    /// Returns `None` if the row was already finished. Timestamps are
    /// fixed-width RFC 3339, so `MAX` compares them chronologically.
    pub fn finish_activity(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Activity>, DbError> {
        let changed = self.conn.execute(
            "
            UPDATE activities
            SET status = 'finished', finished_at = MAX(started_at, ?1), updated_at = MAX(started_at, ?1)
            WHERE id = ?2 AND status = 'started'
            ",
            params![format_timestamp(at), id],
        )?;
        let activity = self.get_activity(id)?;
        if changed == 0 {
            debug!(activity_id = id, "activity already finished");
            return Ok(None);
        }
        Ok(Some(activity))
    }

    /// Deletes an activity, returning the number of rows removed.
    pub fn delete_activity(&self, id: i64) -> Result<u64, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?", [id])?;
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    /// Lists activities whose `started_at` lies within `[start, end]`.
    ///
    /// Both bounds are inclusive. Rows are ordered by start time (then ID) in
    /// the given direction and capped at `limit`.
    pub fn activities_started_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        order: Order,
        limit: u32,
    ) -> Result<Vec<Activity>, DbError> {
        if end < start {
            return Ok(Vec::new());
        }
        let direction = order.as_sql();
        self.query_activities(
            &format!(
                "
                SELECT {ACTIVITY_COLUMNS}
                FROM activities
                WHERE started_at >= ? AND started_at <= ?
                ORDER BY started_at {direction}, id {direction}
                LIMIT ?
                "
            ),
            params![format_timestamp(start), format_timestamp(end), limit],
        )
    }

    fn query_activities<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Activity>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, ActivityRecord::from_row)?;
        let mut activities = Vec::new();
        for row in rows {
            activities.push(row?.into_activity()?);
        }
        Ok(activities)
    }
}

fn parse_timestamp(timestamp: &str, record: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record: record.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{Duration, TimeZone};

    use super::*;

    fn db_with_work() -> (Database, CategoryId) {
        let db = Database::open_in_memory().expect("open in-memory db");
        let work = db.insert_category("Work", "").expect("insert category");
        (db, work.id)
    }

    fn start(db: &Database, category: CategoryId, at: DateTime<Utc>, what: &str) -> Activity {
        db.insert_activity(&NewActivity::new(category, what, at))
            .expect("insert activity")
    }

    #[test]
    fn init_is_idempotent_and_records_migrations() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("timetrack.db");
        drop(Database::open(&path).unwrap());
        let db = Database::open(&path).unwrap();

        assert_eq!(
            db.applied_migrations().unwrap(),
            vec!["0001_create_categories", "0002_create_activities"]
        );
    }

    #[test]
    fn schema_has_expected_indexes() {
        let db = Database::open_in_memory().unwrap();
        let mut stmt = db.conn.prepare("PRAGMA index_list(activities)").unwrap();
        let names: HashSet<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .map(|row| row.unwrap())
            .collect();
        assert!(names.contains("idx_activities_status"));
        assert!(names.contains("idx_activities_started"));
    }

    #[test]
    fn seed_only_fills_empty_table() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.seed_default_categories().unwrap(), DEFAULT_CATEGORIES.len());
        assert_eq!(db.seed_default_categories().unwrap(), 0);

        let names: Vec<String> = db
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Work", "Study", "Exercise", "Break", "Leisure"]);
    }

    #[test]
    fn duplicate_category_name_is_rejected() {
        let (db, _) = db_with_work();
        assert!(db.insert_category("Work", "again").is_err());
    }

    #[test]
    fn insert_activity_assigns_id_and_started_status() {
        let (db, work) = db_with_work();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let activity = start(&db, work, at, "coding");

        assert!(activity.id.get() > 0);
        assert_eq!(activity.status, ActivityStatus::Started);
        assert_eq!(activity.started_at, at);
        assert_eq!(activity.updated_at, at);
        assert!(activity.finished_at.is_none());
    }

    #[test]
    fn insert_activity_with_unknown_category_is_invalid_reference() {
        let (db, _) = db_with_work();
        let err = db
            .insert_activity(&NewActivity::new(
                CategoryId::new(99).unwrap(),
                "x",
                Utc::now(),
            ))
            .unwrap_err();
        assert!(err.is_foreign_key_violation());
        assert!(matches!(
            StoreError::from(err),
            StoreError::InvalidReference(_)
        ));
    }

    #[test]
    fn finish_activity_applies_once() {
        let (db, work) = db_with_work();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let activity = start(&db, work, at, "coding");
        let finished_at = at + Duration::milliseconds(90_500);

        let stored = db
            .finish_activity(activity.id.get(), finished_at)
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ActivityStatus::Finished);
        assert_eq!(stored.finished_at, Some(finished_at));
        assert_eq!(stored.updated_at, finished_at);
        assert!(
            db.list_activities_by_status(ActivityStatus::Started)
                .unwrap()
                .is_empty()
        );

        let again = db
            .finish_activity(activity.id.get(), finished_at + Duration::hours(1))
            .unwrap();
        assert!(again.is_none());
        assert_eq!(db.get_activity(activity.id.get()).unwrap(), stored);
    }

    #[test]
    fn finish_activity_clamps_to_start() {
        let (db, work) = db_with_work();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let activity = start(&db, work, at, "coding");

        let stored = db
            .finish_activity(activity.id.get(), at - Duration::minutes(5))
            .unwrap()
            .unwrap();
        assert_eq!(stored.finished_at, Some(at));
    }

    #[test]
    fn finish_missing_row_is_not_found() {
        let (db, _) = db_with_work();
        let err = db.finish_activity(41, Utc::now()).unwrap_err();
        assert!(matches!(err, DbError::NotFound { id: 41, .. }));
    }

    #[test]
    fn stale_update_keeps_row_finished() {
        let (db, work) = db_with_work();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let mut snapshot = start(&db, work, at, "coding");
        let finished_at = at + Duration::minutes(30);
        db.finish_activity(snapshot.id.get(), finished_at).unwrap();

        snapshot.amend(work, "renamed".to_string(), at + Duration::minutes(45));
        let stored = db.update_activity(&snapshot).unwrap();
        assert_eq!(stored.status, ActivityStatus::Finished);
        assert_eq!(stored.finished_at, Some(finished_at));
        assert_eq!(stored.description, "renamed");
    }

    #[test]
    fn status_and_finished_at_must_agree() {
        let (db, work) = db_with_work();
        let activity = start(&db, work, Utc::now(), "coding");
        let result = db.conn.execute(
            "UPDATE activities SET status = 'finished' WHERE id = ?",
            [activity.id.get()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let (db, work) = db_with_work();
        let activity = NewActivity::new(work, "ghost", Utc::now())
            .into_activity(ActivityId::new(41).unwrap());
        let err = db.update_activity(&activity).unwrap_err();
        assert!(matches!(err, DbError::NotFound { id: 41, .. }));
    }

    #[test]
    fn delete_reports_rows_affected() {
        let (db, work) = db_with_work();
        let activity = start(&db, work, Utc::now(), "coding");

        assert_eq!(db.delete_activity(activity.id.get()).unwrap(), 1);
        assert_eq!(db.delete_activity(activity.id.get()).unwrap(), 0);
        assert!(matches!(
            db.get_activity(activity.id.get()),
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn started_between_is_inclusive_ordered_and_limited() {
        let (db, work) = db_with_work();
        let day = Utc.with_ymd_and_hms(2022, 10, 31, 0, 0, 0).unwrap();
        let end_of_day = day + Duration::days(1) - Duration::microseconds(1);

        let first = start(&db, work, day, "midnight");
        let middle = start(&db, work, day + Duration::hours(12), "noon");
        let last = start(&db, work, end_of_day, "last instant");
        let next_day = start(&db, work, day + Duration::days(1), "next day");

        let asc = db
            .activities_started_between(day, end_of_day, Order::Asc, 10)
            .unwrap();
        let ids: Vec<_> = asc.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![first.id, middle.id, last.id]);
        assert!(!ids.contains(&next_day.id));

        let desc = db
            .activities_started_between(day, end_of_day, Order::Desc, 2)
            .unwrap();
        let ids: Vec<_> = desc.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![last.id, middle.id]);
    }

    #[test]
    fn corrupt_timestamp_is_reported() {
        let (db, work) = db_with_work();
        let activity = start(&db, work, Utc::now(), "coding");
        db.conn
            .execute(
                "UPDATE activities SET started_at = 'yesterday' WHERE id = ?",
                [activity.id.get()],
            )
            .unwrap();

        let err = db.get_activity(activity.id.get()).unwrap_err();
        assert!(matches!(err, DbError::TimestampParse { .. }));
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let a = format_timestamp(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let b = format_timestamp(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::microseconds(1),
        );
        assert_eq!(a, "2025-01-01T00:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
