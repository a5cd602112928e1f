//! CLI subcommand implementations.

pub mod activities;
pub mod categories;
pub mod filter;
pub mod render;

use std::io::Write;

use anyhow::Result;

use crate::app::App;
use crate::cli::{CategoriesAction, Commands};

/// Runs one subcommand against `app`.
pub async fn run<W: Write, E: Write>(
    app: &App,
    command: Commands,
    json: bool,
    writer: &mut W,
    warnings: &mut E,
) -> Result<()> {
    match command {
        Commands::Start {
            category,
            description,
        } => activities::start(writer, app, category, &description, json).await,
        Commands::Finish { id } => activities::finish(writer, app, id, json).await,
        Commands::Update {
            id,
            category,
            description,
        } => activities::update(writer, app, id, category, &description, json).await,
        Commands::Delete { id } => activities::delete(writer, app, id, json).await,
        Commands::Show { id } => activities::show(writer, app, id, json).await,
        Commands::List => activities::list(writer, app, json).await,
        Commands::Filter {
            period,
            since,
            until,
            order,
            limit,
        } => {
            let args = filter::FilterArgs {
                period,
                since,
                until,
                order,
                limit,
            };
            filter::run(writer, warnings, app, &args, json).await
        }
        Commands::Categories { action: None } => categories::list(writer, app, json).await,
        Commands::Categories {
            action: Some(CategoriesAction::Add { name, description }),
        } => categories::add(writer, app, &name, &description, json).await,
    }
}
