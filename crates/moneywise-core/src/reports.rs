//! Spending summaries and their text rendering
//!
//! Data is gathered by the storage layer (see `Database::today_summary` and
//! `Database::month_report`); this module only aggregates and formats.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{format_amount, normalize_category_name, Category, Expense};

/// Render an amount with the optional currency label
pub fn format_money(amount: Decimal, currency: Option<&str>) -> String {
    match currency {
        Some(currency) => format!("{} {}", format_amount(amount), currency),
        None => format_amount(amount),
    }
}

/// `[start of today, start of tomorrow)`
pub fn today_range(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = now.date().and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// `[first day of this month, first day of next month)`
pub fn month_range(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let date = now.date();
    let first = date.with_day(1).unwrap_or(date);
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .unwrap_or(first + Duration::days(31));
    (first.and_time(NaiveTime::MIN), next.and_time(NaiveTime::MIN))
}

/// Expenses of a period and their total
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub expenses: Vec<Expense>,
    pub total: Decimal,
}

impl ExpenseSummary {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, expenses: Vec<Expense>) -> Self {
        let total = expenses.iter().map(|e| e.amount).sum();
        Self {
            start,
            end,
            expenses,
            total,
        }
    }

    /// Totals by normalized category name, keeping the display name of the first expense
    pub fn category_totals(&self) -> BTreeMap<String, (String, Decimal)> {
        let mut totals: BTreeMap<String, (String, Decimal)> = BTreeMap::new();
        for expense in &self.expenses {
            let entry = totals
                .entry(normalize_category_name(&expense.category_name))
                .or_insert_with(|| (expense.category_name.clone(), Decimal::ZERO));
            entry.1 += expense.amount;
        }
        totals
    }
}

/// Where a category stands against its monthly limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum LimitStatus {
    Remaining(Decimal),
    Exhausted,
    Overspent(Decimal),
}

impl LimitStatus {
    pub fn of(spent: Decimal, limit: Decimal) -> Self {
        match spent.cmp(&limit) {
            std::cmp::Ordering::Less => Self::Remaining(limit - spent),
            std::cmp::Ordering::Equal => Self::Exhausted,
            std::cmp::Ordering::Greater => Self::Overspent(spent - limit),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryUsage {
    pub category: Category,
    pub spent: Decimal,
    pub status: LimitStatus,
}

/// Month statistics: every category against its limit, plus spending in
/// categories that no longer exist
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub summary: ExpenseSummary,
    pub categories: Vec<CategoryUsage>,
    pub unlisted: Vec<(String, Decimal)>,
}

impl MonthReport {
    /// Categories sorted by spending (highest first), then by name
    pub fn new(summary: ExpenseSummary, categories: Vec<Category>) -> Self {
        let mut totals = summary.category_totals();

        let mut usage: Vec<CategoryUsage> = categories
            .into_iter()
            .map(|category| {
                let spent = totals
                    .remove(&category.normalized_name)
                    .map(|(_, spent)| spent)
                    .unwrap_or(Decimal::ZERO);
                CategoryUsage {
                    status: LimitStatus::of(spent, category.monthly_limit),
                    category,
                    spent,
                }
            })
            .collect();
        usage.sort_by(|a, b| {
            b.spent
                .cmp(&a.spent)
                .then_with(|| a.category.normalized_name.cmp(&b.category.normalized_name))
        });

        let mut unlisted: Vec<(String, Decimal)> = totals.into_values().collect();
        unlisted.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            summary,
            categories: usage,
            unlisted,
        }
    }
}

/// Confirmation for a recorded expense
pub fn render_confirmation(expense: &Expense, currency: Option<&str>) -> String {
    let mut lines = vec![
        "Expense saved".to_string(),
        format!("Amount: {}", format_money(expense.amount, currency)),
        format!("Category: {}", expense.category_name),
    ];
    if let Some(description) = &expense.description {
        lines.push(format!("Comment: {}", description));
    }
    lines.join("\n")
}

fn expense_line(expense: &Expense, time_format: &str, currency: Option<&str>) -> String {
    let description = expense
        .description
        .as_ref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default();
    format!(
        "{} - {}: {}{}",
        expense.spent_at.format(time_format),
        expense.category_name,
        format_money(expense.amount, currency),
        description
    )
}

pub fn render_today(summary: &ExpenseSummary, currency: Option<&str>) -> String {
    if summary.expenses.is_empty() {
        return "No expenses today yet.".to_string();
    }

    let mut lines = vec!["Expenses today:".to_string()];
    lines.extend(
        summary
            .expenses
            .iter()
            .map(|e| expense_line(e, "%H:%M", currency)),
    );
    lines.push(format!("Total: {}", format_money(summary.total, currency)));
    lines.join("\n")
}

pub fn render_month(report: &MonthReport, currency: Option<&str>) -> String {
    if report.summary.expenses.is_empty() && report.categories.is_empty() {
        return "No expenses this month yet.".to_string();
    }

    let mut lines = vec!["Month statistics:".to_string()];
    if report.summary.expenses.is_empty() {
        lines.push("No expenses yet.".to_string());
    }

    for usage in &report.categories {
        let mut line = format!(
            "{}: {} of {} limit",
            usage.category.name,
            format_money(usage.spent, currency),
            format_money(usage.category.monthly_limit, currency)
        );
        match usage.status {
            LimitStatus::Remaining(left) => {
                line.push_str(&format!(", {} left", format_money(left, currency)))
            }
            LimitStatus::Exhausted => line.push_str(", limit reached"),
            LimitStatus::Overspent(over) => {
                line.push_str(&format!(", overspent by {}", format_money(over, currency)))
            }
        }
        lines.push(line);
    }

    for (name, total) in &report.unlisted {
        lines.push(format!("{}: {} (no limit set)", name, format_money(*total, currency)));
    }

    lines.push(format!(
        "Total: {}",
        format_money(report.summary.total, currency)
    ));
    lines.join("\n")
}

pub fn render_recent(expenses: &[Expense], currency: Option<&str>) -> String {
    if expenses.is_empty() {
        return "No expenses yet.".to_string();
    }

    let mut lines = vec!["Recent expenses:".to_string()];
    lines.extend(
        expenses
            .iter()
            .map(|e| expense_line(e, "%d.%m %H:%M", currency)),
    );
    lines.join("\n")
}
