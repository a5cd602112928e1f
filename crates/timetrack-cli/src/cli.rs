//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Activity time tracker.
///
/// Starting an activity closes whatever was running before it.
#[derive(Debug, Parser)]
#[command(name = "timetrack", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an activity, finishing any that are still running.
    Start {
        /// Category ID.
        #[arg(long)]
        category: i64,

        /// What you are working on.
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Finish an activity.
    Finish {
        /// Activity ID.
        id: i64,
    },

    /// Change an activity's category and description.
    Update {
        /// Activity ID.
        id: i64,

        /// New category ID.
        #[arg(long)]
        category: i64,

        /// New description.
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete an activity.
    Delete {
        /// Activity ID.
        id: i64,
    },

    /// Show a single activity.
    Show {
        /// Activity ID.
        id: i64,
    },

    /// List every activity.
    List,

    /// List activities started within a period.
    Filter {
        /// Named period: today, yesterday, weekly or monthly.
        #[arg(long, conflicts_with_all = ["since", "until"])]
        period: Option<String>,

        /// Explicit start bound (RFC 3339).
        #[arg(long, requires = "until")]
        since: Option<DateTime<Utc>>,

        /// Explicit end bound (RFC 3339), inclusive.
        #[arg(long, requires = "since")]
        until: Option<DateTime<Utc>>,

        /// Sort direction: asc or desc.
        #[arg(long)]
        order: Option<String>,

        /// Maximum number of activities.
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,
    },

    /// List or add categories.
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },
}

/// Category subcommands.
#[derive(Debug, Subcommand)]
pub enum CategoriesAction {
    /// Add a category.
    Add {
        /// Category name.
        name: String,

        /// Category description.
        #[arg(short, long, default_value = "")]
        description: String,
    },
}
