//! Human-readable output for activities and categories.

use std::io::{self, Write};

use chrono::{DateTime, FixedOffset};

use timetrack_core::{Activity, Category};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// An activity ready for display.
#[derive(Debug, Clone)]
pub struct ActivityView<'a> {
    pub activity: &'a Activity,
    pub category: String,
    pub started_at: DateTime<FixedOffset>,
    pub finished_at: Option<DateTime<FixedOffset>>,
}

/// Formats a duration as `1h 5m`, `12m` or `40s`.
pub fn format_duration(duration: chrono::Duration) -> String {
    let seconds = duration.num_seconds();
    if seconds < 0 {
        return "0s".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else if minutes >= 1 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}

pub fn write_activity<W: Write>(writer: &mut W, view: &ActivityView<'_>) -> io::Result<()> {
    let activity = view.activity;
    writeln!(writer, "Activity #{} [{}]", activity.id, activity.status)?;
    writeln!(
        writer,
        "  Category:    {} (#{})",
        view.category, activity.category_id
    )?;
    if !activity.description.is_empty() {
        writeln!(writer, "  Description: {}", activity.description)?;
    }
    writeln!(
        writer,
        "  Started:     {}",
        view.started_at.format(TIME_FORMAT)
    )?;
    if let Some(finished_at) = view.finished_at {
        writeln!(writer, "  Finished:    {}", finished_at.format(TIME_FORMAT))?;
    }
    if let Some(duration) = activity.duration() {
        writeln!(writer, "  Duration:    {}", format_duration(duration))?;
    }
    Ok(())
}

/// Writes activity blocks separated by blank lines.
pub fn write_activities<W: Write>(writer: &mut W, views: &[ActivityView<'_>]) -> io::Result<()> {
    if views.is_empty() {
        return writeln!(writer, "No activities.");
    }
    for (i, view) in views.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        write_activity(writer, view)?;
    }
    Ok(())
}

pub fn write_categories<W: Write>(writer: &mut W, categories: &[Category]) -> io::Result<()> {
    if categories.is_empty() {
        return writeln!(writer, "No categories.");
    }
    writeln!(writer, "{:>4}  {:<16}  Description", "ID", "Name")?;
    writeln!(writer, "────  ────────────────  ──────────────────────────")?;
    for category in categories {
        writeln!(
            writer,
            "{:>4}  {:<16}  {}",
            category.id, category.name, category.description
        )?;
    }
    Ok(())
}
