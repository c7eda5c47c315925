//! Domain models for Moneywise

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of the person reporting expenses (chat/user id of the transport)
pub type UserId = i64;

/// A spending category owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    /// Case-folded, trimmed name used for uniqueness and typed lookups
    pub normalized_name: String,
    pub monthly_limit: Decimal,
}

/// Data for creating a category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub monthly_limit: Decimal,
}

/// An expense that has been committed by a Recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: UserId,
    pub category_id: i64,
    pub category_name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub spent_at: NaiveDateTime,
}

/// Partial set of fields recognized from one piece of free text.
///
/// Any subset of fields may be set. A draft with nothing set means the
/// input could not be understood.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub category: Option<Category>,
    pub amount: Option<Decimal>,
    pub spent_at: Option<NaiveDateTime>,
    pub description: Option<String>,
}

impl Draft {
    /// True when no entity at all was recognized
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.amount.is_none()
            && self.spent_at.is_none()
            && self.description.is_none()
    }
}

/// Normalize a category name for lookups and uniqueness checks
pub fn normalize_category_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Render a monetary value: two-place rounding, integral values without decimals
///
/// `2500.00` renders as `2500`, `12.50` as `12.5`.
pub fn format_amount(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

/// Render a date the way users type it (`DD.MM.YYYY`)
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(2500)), "2500");
        assert_eq!(format_amount(dec!(2500.00)), "2500");
        assert_eq!(format_amount(dec!(12.50)), "12.5");
        assert_eq!(format_amount(dec!(12.345)), "12.34");
        assert_eq!(format_amount(dec!(0.99)), "0.99");
    }

    #[test]
    fn test_normalize_category_name() {
        assert_eq!(normalize_category_name("  Taxi "), "taxi");
        assert_eq!(normalize_category_name("ЕДА"), "еда");
    }

    #[test]
    fn test_empty_draft() {
        assert!(Draft::default().is_empty());
        let draft = Draft {
            description: Some("coffee".to_string()),
            ..Default::default()
        };
        assert!(!draft.is_empty());
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 5).unwrap();
        assert_eq!(format_date(date), "05.09.2024");
    }
}
