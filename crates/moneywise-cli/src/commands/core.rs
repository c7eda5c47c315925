//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `parse_money` - Parse a non-negative amount argument
//! - `cmd_init` - Initialize the database

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use moneywise_core::{Database, Settings};
use rust_decimal::Decimal;

/// Open the configured database, creating its directory if needed
pub fn open_db(settings: &Settings) -> Result<Database> {
    settings
        .ensure_database_dir()
        .context("Failed to create database directory")?;
    Database::new(&settings.database_path).with_context(|| {
        format!(
            "Failed to open database at {}",
            settings.database_path.display()
        )
    })
}

/// Parse a limit-style amount: decimal with `.` or `,`, zero allowed
pub fn parse_money(value: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(&value.trim().replace(',', "."))
        .with_context(|| format!("Invalid amount: {}", value))?;
    if amount < Decimal::ZERO {
        bail!("Amount cannot be negative: {}", value);
    }
    Ok(amount)
}

pub fn cmd_init(settings: &Settings) -> Result<()> {
    println!(
        "🔧 Initializing database at {}...",
        settings.database_path.display()
    );

    open_db(settings)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create a category: moneywise categories add Taxi --limit 20000");
    println!("  2. Record an expense: moneywise add 2500 taxi airport");
    println!("  3. Or just describe it: moneywise chat");

    Ok(())
}
