//! One-line `/add <amount> <category> [description]` command
//!
//! Amount comes first, then a single-word category, then free text. This is
//! a separate entry point from the dialog: it either records the expense in
//! one go or fails, and never touches a session.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::extract::parse_amount;
use crate::ledger::{CategoryLookup, Recorder};
use crate::models::{Expense, UserId};

const COMMAND: &str = "/add";

/// Parsed `/add` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAdd {
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
}

/// Parse the text of an `/add` command; the leading `/add` is optional
pub fn parse_quick_add(text: &str) -> Result<QuickAdd> {
    let mut payload = text.trim();
    if let Some(rest) = payload.strip_prefix(COMMAND) {
        payload = rest.trim();
    }

    if payload.is_empty() {
        return Err(Error::Validation(
            "Not enough data. Use: /add <amount> <category> [description]".to_string(),
        ));
    }

    let mut words = payload.split_whitespace();
    let (Some(amount), Some(category)) = (words.next(), words.next()) else {
        return Err(Error::Validation(
            "Both amount and category are required, e.g. /add 250 food".to_string(),
        ));
    };
    let description = words.collect::<Vec<_>>().join(" ");
    let description = (!description.is_empty()).then_some(description);

    Ok(QuickAdd {
        amount: parse_amount(amount)?,
        category: category.to_string(),
        description,
    })
}

/// Parse an `/add` command and record it
pub async fn quick_add<C, R>(
    categories: &C,
    recorder: &R,
    user_id: UserId,
    text: &str,
    spent_at: NaiveDateTime,
) -> Result<Expense>
where
    C: CategoryLookup + ?Sized,
    R: Recorder + ?Sized,
{
    let command = parse_quick_add(text)?;
    debug!(user_id, ?command, "Quick add");

    let category = categories
        .find_by_name(user_id, &command.category)
        .await?
        .ok_or_else(|| Error::NotFound(format!("category \"{}\"", command.category)))?;

    let expense = recorder
        .record(
            user_id,
            command.amount,
            category.id,
            command.description.as_deref(),
            spent_at,
        )
        .await?;
    info!(user_id, expense_id = expense.id, "Expense recorded via quick add");
    Ok(expense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn spent_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 10)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_full_command() {
        let parsed = parse_quick_add("/add 250 food lunch with team").unwrap();
        assert_eq!(parsed.amount, dec!(250));
        assert_eq!(parsed.category, "food");
        assert_eq!(parsed.description.as_deref(), Some("lunch with team"));
    }

    #[test]
    fn test_parse_without_prefix_or_description() {
        let parsed = parse_quick_add("  12,5   taxi ").unwrap();
        assert_eq!(parsed.amount, dec!(12.5));
        assert_eq!(parsed.category, "taxi");
        assert_eq!(parsed.description, None);
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_quick_add("/add").unwrap_err();
        assert!(err.to_string().contains("Not enough data"));

        let err = parse_quick_add("/add 250").unwrap_err();
        assert!(err.to_string().contains("amount and category"));

        let err = parse_quick_add("/add lots food").unwrap_err();
        assert_eq!(err.to_string(), "The amount must be a number.");

        let err = parse_quick_add("/add 0 food").unwrap_err();
        assert_eq!(err.to_string(), "The amount must be positive.");
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_quick_add_records_expense() {
        let ledger = MemoryLedger::new();
        let food = ledger.add_category(7, "Food", dec!(1000)).unwrap();

        let expense = quick_add(&ledger, &ledger, 7, "/add 250 FOOD pizza", spent_at())
            .await
            .unwrap();
        assert_eq!(expense.category_id, food.id);
        assert_eq!(expense.amount, dec!(250));
        assert_eq!(expense.description.as_deref(), Some("pizza"));
        assert_eq!(expense.spent_at, spent_at());
        assert_eq!(ledger.expenses(7).len(), 1);
    }

    #[tokio::test]
    async fn test_quick_add_unknown_category() {
        let ledger = MemoryLedger::new();
        ledger.add_category(7, "Food", dec!(1000)).unwrap();

        let err = quick_add(&ledger, &ledger, 7, "/add 250 books", spent_at())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(ledger.expenses(7).is_empty());
    }
}
