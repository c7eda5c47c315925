//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Moneywise - Track expenses by just describing them
#[derive(Parser)]
#[command(name = "moneywise")]
#[command(about = "Personal expense tracker with natural-language entry", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides settings and MONEYWISE_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Settings file (defaults to ~/.local/share/moneywise/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User the command acts for
    #[arg(short, long, default_value = "1", global = true)]
    pub user: i64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Record an expense in one line: <amount> <category> [description]
    Add {
        /// Amount, category and optional description
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Interactive entry: describe an expense and answer the follow-up questions
    Chat,

    /// Show the most recent expenses
    Recent {
        /// Number of expenses to show (defaults to the configured recent_limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show today's expenses and total
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show this month's spending per category against the limits
    Month {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories (default)
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Monthly spending limit
        #[arg(short, long, default_value = "0")]
        limit: String,
    },

    /// Change a category's monthly limit
    Limit {
        /// Category name
        name: String,

        /// New monthly limit
        amount: String,
    },

    /// Remove a category and all of its expenses
    Remove {
        /// Category name
        name: String,
    },
}
