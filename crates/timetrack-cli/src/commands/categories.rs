//! Categories command: list categories or add one.

use std::io::Write;

use anyhow::{Context, Result};

use timetrack_core::InputError;

use super::activities::write_json;
use super::render;
use crate::app::App;

/// Lists every category, read straight from the store.
pub async fn list<W: Write>(writer: &mut W, app: &App, json: bool) -> Result<()> {
    let categories = app
        .engine()
        .categories()
        .get_all()
        .await
        .context("failed to list categories")?;
    if json {
        return write_json(writer, &categories);
    }
    render::write_categories(writer, &categories)?;
    Ok(())
}

/// Adds a category. The engine's cache picks it up on first use.
pub async fn add<W: Write>(
    writer: &mut W,
    app: &App,
    name: &str,
    description: &str,
    json: bool,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::Empty {
            field: "category name",
        })
        .context("invalid category");
    }

    let (name, description) = (name.to_string(), description.to_string());
    let category = app
        .store()
        .with_db(move |db| db.insert_category(&name, &description))
        .await
        .context("failed to add category")?;
    tracing::info!(category_id = %category.id, name = %category.name, "category added");

    if json {
        write_json(writer, &category)
    } else {
        writeln!(writer, "Added category #{} {}", category.id, category.name)?;
        Ok(())
    }
}
