//! Category management commands

use anyhow::{Context, Result};
use moneywise_core::models::format_amount;
use moneywise_core::{Category, Database, NewCategory, UserId};

use super::parse_money;

fn find_category(db: &Database, user: UserId, name: &str) -> Result<Category> {
    db.find_category_by_name(user, name)?
        .with_context(|| format!("Category \"{}\" not found", name.trim()))
}

pub fn cmd_categories_list(db: &Database, user: UserId) -> Result<()> {
    let categories = db.list_categories(user)?;

    if categories.is_empty() {
        println!("No categories yet. Add one with: moneywise categories add <name> --limit <amount>");
        return Ok(());
    }

    println!("📂 Categories:");
    println!();
    println!("{:>5}  {:<24}  {:>12}", "ID", "Name", "Limit");
    println!("{}", "-".repeat(45));
    for category in &categories {
        println!(
            "{:>5}  {:<24}  {:>12}",
            category.id,
            category.name,
            format_amount(category.monthly_limit)
        );
    }

    Ok(())
}

pub fn cmd_categories_add(db: &Database, user: UserId, name: &str, limit: &str) -> Result<()> {
    let monthly_limit = parse_money(limit)?;
    let category = db.create_category(
        user,
        &NewCategory {
            name: name.to_string(),
            monthly_limit,
        },
    )?;

    println!(
        "✅ Created category \"{}\" (id {}, monthly limit {})",
        category.name,
        category.id,
        format_amount(category.monthly_limit)
    );
    Ok(())
}

pub fn cmd_categories_limit(db: &Database, user: UserId, name: &str, amount: &str) -> Result<()> {
    let monthly_limit = parse_money(amount)?;
    let category = find_category(db, user, name)?;
    db.set_category_limit(user, category.id, monthly_limit)?;

    println!(
        "✅ Monthly limit for \"{}\" set to {}",
        category.name,
        format_amount(monthly_limit)
    );
    Ok(())
}

pub fn cmd_categories_remove(db: &Database, user: UserId, name: &str) -> Result<()> {
    let category = find_category(db, user, name)?;
    db.delete_category(user, category.id)?;

    println!("🗑️  Removed category \"{}\" and its expenses", category.name);
    Ok(())
}
