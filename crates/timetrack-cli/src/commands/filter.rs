//! Filter command: activities started within a named period or explicit bounds.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use timetrack_core::{Activity, Order, PeriodFilter};

use super::activities::{views, write_json};
use super::render;
use crate::app::App;

/// Arguments of `timetrack filter`.
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    pub period: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub order: Option<String>,
    pub limit: Option<i64>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> PeriodFilter {
        let mut filter = match (self.since, self.until) {
            (Some(start), Some(end)) => PeriodFilter::between(start, end),
            _ => self
                .period
                .as_deref()
                .map_or_else(PeriodFilter::default, PeriodFilter::named),
        };
        if let Some(order) = &self.order {
            filter = filter.order(order.clone());
        }
        if let Some(limit) = self.limit {
            filter = filter.limit(limit);
        }
        filter
    }
}

/// JSON output structure.
#[derive(Debug, Serialize)]
struct JsonFilterResult<'a> {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    order: Order,
    limit: u32,
    warnings: Vec<String>,
    activities: &'a [Activity],
}

/// Runs the filter command. Resolver warnings go to `warnings`.
pub async fn run<W: Write, E: Write>(
    writer: &mut W,
    warnings: &mut E,
    app: &App,
    args: &FilterArgs,
    json: bool,
) -> Result<()> {
    let filter = args.to_filter();
    let result = app
        .call(
            "filter activities",
            app.engine().filter_activities_by_period(&filter),
        )
        .await?;

    for warning in &result.query.warnings {
        writeln!(warnings, "warning: {warning}")?;
    }

    if json {
        return write_json(
            writer,
            &JsonFilterResult {
                start: result.query.start,
                end: result.query.end,
                order: result.query.order,
                limit: result.query.limit,
                warnings: result.query.warnings.iter().map(ToString::to_string).collect(),
                activities: &result.activities,
            },
        );
    }

    let views = views(app, &result.activities).await;
    render::write_activities(writer, &views)?;
    Ok(())
}
