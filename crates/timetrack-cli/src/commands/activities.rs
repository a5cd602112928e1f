//! Activity lifecycle commands: start, finish, update, delete, show and list.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use timetrack_core::{Activity, ActivityId, CategoryId};

use super::render::{self, ActivityView};
use crate::app::App;

pub fn activity_id(raw: i64) -> Result<ActivityId> {
    ActivityId::new(raw).context("invalid activity ID")
}

pub fn category_id(raw: i64) -> Result<CategoryId> {
    CategoryId::new(raw).context("invalid category ID")
}

/// Resolves display fields for each activity.
pub async fn views<'a>(app: &App, activities: &'a [Activity]) -> Vec<ActivityView<'a>> {
    let mut views = Vec::with_capacity(activities.len());
    for activity in activities {
        views.push(ActivityView {
            activity,
            category: app.category_name(activity.category_id).await,
            started_at: app.localize(activity.started_at),
            finished_at: activity.finished_at.map(|at| app.localize(at)),
        });
    }
    views
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

async fn print_one<W: Write>(
    writer: &mut W,
    app: &App,
    activity: &Activity,
    json: bool,
) -> Result<()> {
    if json {
        return write_json(writer, activity);
    }
    let views = views(app, std::slice::from_ref(activity)).await;
    render::write_activities(writer, &views)?;
    Ok(())
}

pub async fn start<W: Write>(
    writer: &mut W,
    app: &App,
    category: i64,
    description: &str,
    json: bool,
) -> Result<()> {
    let category = category_id(category)?;
    let activity = app
        .call(
            "start activity",
            app.engine().start_activity(category, description),
        )
        .await?;
    print_one(writer, app, &activity, json).await
}

pub async fn finish<W: Write>(writer: &mut W, app: &App, id: i64, json: bool) -> Result<()> {
    let id = activity_id(id)?;
    let activity = app
        .call("finish activity", app.engine().finish_activity(id))
        .await?;
    print_one(writer, app, &activity, json).await
}

pub async fn update<W: Write>(
    writer: &mut W,
    app: &App,
    id: i64,
    category: i64,
    description: &str,
    json: bool,
) -> Result<()> {
    let id = activity_id(id)?;
    let category = category_id(category)?;
    let activity = app
        .call(
            "update activity",
            app.engine().update_activity(id, category, description),
        )
        .await?;
    print_one(writer, app, &activity, json).await
}

pub async fn delete<W: Write>(writer: &mut W, app: &App, id: i64, json: bool) -> Result<()> {
    let id = activity_id(id)?;
    app.call("delete activity", app.engine().delete_activity(id))
        .await?;
    if json {
        write_json(writer, &serde_json::json!({ "deleted": id }))
    } else {
        writeln!(writer, "Deleted activity #{id}")?;
        Ok(())
    }
}

pub async fn show<W: Write>(writer: &mut W, app: &App, id: i64, json: bool) -> Result<()> {
    let id = activity_id(id)?;
    let activity = app
        .call("get activity", app.engine().get_activity(id))
        .await?;
    print_one(writer, app, &activity, json).await
}

pub async fn list<W: Write>(writer: &mut W, app: &App, json: bool) -> Result<()> {
    let activities = app
        .call("list activities", app.engine().get_activities())
        .await?;
    if json {
        return write_json(writer, &activities);
    }
    let views = views(app, &activities).await;
    render::write_activities(writer, &views)?;
    Ok(())
}
