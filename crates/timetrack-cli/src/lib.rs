//! Timetrack CLI library.
//!
//! This crate provides the CLI interface for the activity tracker.

mod app;
mod cli;
pub mod commands;
mod config;

pub use app::App;
pub use cli::{CategoriesAction, Cli, Commands};
pub use config::Config;
