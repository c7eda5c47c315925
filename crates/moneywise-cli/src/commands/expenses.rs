//! One-line entry and report commands

use anyhow::Result;
use chrono::Local;
use moneywise_core::reports::{render_confirmation, render_month, render_recent, render_today};
use moneywise_core::{quick_add, Database, Settings, UserId};

/// Record `<amount> <category> [description]` as of now
pub async fn cmd_add(db: &Database, settings: &Settings, user: UserId, text: &str) -> Result<()> {
    let now = Local::now().naive_local();
    let expense = quick_add(db, db, user, text, now).await?;

    println!("✅ {}", render_confirmation(&expense, settings.currency.as_deref()));
    Ok(())
}

pub fn cmd_recent(
    db: &Database,
    settings: &Settings,
    user: UserId,
    limit: usize,
    json: bool,
) -> Result<()> {
    let expenses = db.list_recent_expenses(user, limit.max(1))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
    } else {
        println!("{}", render_recent(&expenses, settings.currency.as_deref()));
    }
    Ok(())
}

pub fn cmd_today(db: &Database, settings: &Settings, user: UserId, json: bool) -> Result<()> {
    let summary = db.today_summary(user, Local::now().naive_local())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("📅 {}", render_today(&summary, settings.currency.as_deref()));
    }
    Ok(())
}

pub fn cmd_month(db: &Database, settings: &Settings, user: UserId, json: bool) -> Result<()> {
    let report = db.month_report(user, Local::now().naive_local())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("📊 {}", render_month(&report, settings.currency.as_deref()));
    }
    Ok(())
}
