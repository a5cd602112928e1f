//! Period resolution for activity queries.
//!
//! Maps a named period (`today`, `yesterday`, `weekly`, `monthly`) or explicit
//! bounds, plus an ordering and a result limit, into a bounded [`PeriodQuery`].
//! Both boundaries of a named period are computed in the same time zone as
//! the supplied "now", and both are inclusive.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::types::InputError;

/// Result cap applied when the caller gives no usable limit.
pub const DEFAULT_LIMIT: u32 = 1000;

/// Named time windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Local midnight today until now.
    Today,
    /// The whole previous local day.
    Yesterday,
    /// Midnight seven days ago until now.
    Weekly,
    /// Midnight thirty days ago until now.
    Monthly,
}

impl Period {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Inclusive `[start, end]` bounds of this period relative to `now`.
    pub fn range<Tz: TimeZone>(self, now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
        let tz = now.timezone();
        let today = now.date_naive();
        let now_utc = now.with_timezone(&Utc);
        match self {
            Self::Today => (start_of_day(&tz, today), now_utc),
            Self::Yesterday => {
                let yesterday = today - Duration::days(1);
                (start_of_day(&tz, yesterday), end_of_day(&tz, yesterday))
            }
            Self::Weekly => (start_of_day(&tz, today - Duration::days(7)), now_utc),
            Self::Monthly => (start_of_day(&tz, today - Duration::days(30)), now_utc),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(InputError::InvalidPeriod {
                value: s.to_string(),
            }),
        }
    }
}

/// Ordering of query results by `started_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// SQL keyword for this ordering.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Order {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(InputError::InvalidOrder {
                value: s.to_string(),
            }),
        }
    }
}

/// Which window a filter selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSelector {
    /// A period name, validated on resolution.
    Named(String),
    /// Explicit inclusive bounds.
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Caller-supplied period query, constructed per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodFilter {
    pub period: PeriodSelector,
    /// `asc` or `desc`; `None` means descending.
    pub order: Option<String>,
    /// Maximum number of results; `None` or non-positive falls back to the default cap.
    pub limit: Option<i64>,
}

impl PeriodFilter {
    pub fn named(period: impl Into<String>) -> Self {
        Self {
            period: PeriodSelector::Named(period.into()),
            order: None,
            limit: None,
        }
    }

    pub const fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            period: PeriodSelector::Between { start, end },
            order: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Default for PeriodFilter {
    fn default() -> Self {
        Self::named(Period::Today.as_str())
    }
}

/// Non-fatal issues found while resolving a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryWarning {
    /// The requested limit was zero or negative; `applied` was used instead.
    NonPositiveLimit { requested: i64, applied: u32 },
}

impl fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveLimit { requested, applied } => write!(
                f,
                "limit must be a positive integer (got {requested}); using {applied}"
            ),
        }
    }
}

/// A validated, bounded query over activity start times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub order: Order,
    pub limit: u32,
    pub warnings: Vec<QueryWarning>,
}

/// Resolves `filter` relative to `now`.
///
/// Named periods use the time zone carried by `now` for both boundaries.
/// The returned query is always bounded: a missing or non-positive limit is
/// replaced by `default_limit`, with a warning in the latter case.
pub fn resolve<Tz: TimeZone>(
    filter: &PeriodFilter,
    now: &DateTime<Tz>,
    default_limit: u32,
) -> Result<PeriodQuery, InputError> {
    let (start, end) = match &filter.period {
        PeriodSelector::Named(name) => name.parse::<Period>()?.range(now),
        PeriodSelector::Between { start, end } => {
            if start > end {
                return Err(InputError::InvalidRange {
                    start: *start,
                    end: *end,
                });
            }
            (*start, *end)
        }
    };

    let order = filter
        .order
        .as_deref()
        .map(str::parse::<Order>)
        .transpose()?
        .unwrap_or_default();

    let default_limit = default_limit.max(1);
    let mut warnings = Vec::new();
    let limit = match filter.limit {
        None => default_limit,
        Some(requested) if requested <= 0 => {
            warnings.push(QueryWarning::NonPositiveLimit {
                requested,
                applied: default_limit,
            });
            default_limit
        }
        Some(requested) => u32::try_from(requested).unwrap_or(u32::MAX),
    };

    Ok(PeriodQuery {
        start,
        end,
        order,
        limit,
        warnings,
    })
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight: the day starts at 1am local
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am)
                .earliest()
                .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// Last representable instant of a local date (one microsecond before the next midnight).
fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    start_of_day(tz, date + Duration::days(1)) - Duration::microseconds(1)
}
