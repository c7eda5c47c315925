//! Expense operations

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::params;
use rust_decimal::Decimal;

use super::{datetime_column, decimal_column, format_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, UserId};

const EXPENSE_SELECT: &str = "SELECT e.id, e.user_id, e.category_id, c.name, e.amount, e.description, e.spent_at
     FROM expenses e
     JOIN categories c ON c.id = e.category_id";

fn expense_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        category_name: row.get(3)?,
        amount: decimal_column(row, 4)?,
        description: row.get(5)?,
        spent_at: datetime_column(row, 6)?,
    })
}

impl Database {
    /// Record an expense in one of the user's categories
    ///
    /// Fails with `NotFound` when the category does not exist for the user.
    pub fn add_expense(
        &self,
        user_id: UserId,
        amount: Decimal,
        category_id: i64,
        description: Option<&str>,
        spent_at: NaiveDateTime,
    ) -> Result<Expense> {
        if amount <= Decimal::ZERO {
            return Err(Error::Validation(
                "The amount must be positive.".to_string(),
            ));
        }
        let category = self
            .get_category(user_id, category_id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", category_id)))?;
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (user_id, category_id, amount, description, spent_at) VALUES (?, ?, ?, ?, ?)",
            params![
                user_id,
                category_id,
                amount.to_string(),
                description,
                format_datetime(spent_at)
            ],
        )?;

        Ok(Expense {
            id: conn.last_insert_rowid(),
            user_id,
            category_id,
            category_name: category.name,
            amount,
            description,
            spent_at,
        })
    }

    /// Most recent expenses first
    pub fn list_recent_expenses(&self, user_id: UserId, limit: usize) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE e.user_id = ? ORDER BY e.spent_at DESC, e.id DESC LIMIT ?",
            EXPENSE_SELECT
        ))?;

        let expenses = stmt
            .query_map(params![user_id, limit as i64], expense_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Expenses with `start <= spent_at < end`, oldest first
    pub fn expenses_between(
        &self,
        user_id: UserId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE e.user_id = ? AND e.spent_at >= ? AND e.spent_at < ? ORDER BY e.spent_at, e.id",
            EXPENSE_SELECT
        ))?;

        let expenses = stmt
            .query_map(
                params![user_id, format_datetime(start), format_datetime(end)],
                expense_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Whether the user logged anything on the local calendar day `date`
    pub fn has_expenses_on(&self, user_id: UserId, date: NaiveDate) -> Result<bool> {
        let start = date.and_time(NaiveTime::MIN);
        let end = start + Duration::days(1);

        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ? AND spent_at >= ? AND spent_at < ?",
            params![user_id, format_datetime(start), format_datetime(end)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Delete one expense
    pub fn delete_expense(&self, user_id: UserId, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("expense {}", id)));
        }
        Ok(())
    }
}
