//! Moneywise CLI - Personal expense tracker
//!
//! Usage:
//!   moneywise init                      Initialize database
//!   moneywise categories add Taxi -l 20000
//!   moneywise add 2500 taxi airport     Record an expense in one line
//!   moneywise chat                      Describe expenses interactively
//!   moneywise month                     Spending against category limits
//!   moneywise serve --port 3000         Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use moneywise_core::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(db) = &cli.db {
        settings.database_path = db.clone();
    }

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > configured level
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let user = cli.user;
    match cli.command {
        Commands::Init => commands::cmd_init(&settings),
        Commands::Categories { action } => {
            let db = commands::open_db(&settings)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db, user),
                Some(CategoriesAction::Add { name, limit }) => {
                    commands::cmd_categories_add(&db, user, &name, &limit)
                }
                Some(CategoriesAction::Limit { name, amount }) => {
                    commands::cmd_categories_limit(&db, user, &name, &amount)
                }
                Some(CategoriesAction::Remove { name }) => {
                    commands::cmd_categories_remove(&db, user, &name)
                }
            }
        }
        Commands::Add { words } => {
            let db = commands::open_db(&settings)?;
            commands::cmd_add(&db, &settings, user, &words.join(" ")).await
        }
        Commands::Chat => {
            let db = commands::open_db(&settings)?;
            commands::cmd_chat(&db, &settings, user).await
        }
        Commands::Recent { limit, json } => {
            let db = commands::open_db(&settings)?;
            let limit = limit.unwrap_or(settings.recent_limit);
            commands::cmd_recent(&db, &settings, user, limit, json)
        }
        Commands::Today { json } => {
            let db = commands::open_db(&settings)?;
            commands::cmd_today(&db, &settings, user, json)
        }
        Commands::Month { json } => {
            let db = commands::open_db(&settings)?;
            commands::cmd_month(&db, &settings, user, json)
        }
        Commands::Serve { port, host } => commands::cmd_serve(&settings, &host, port).await,
    }
}
