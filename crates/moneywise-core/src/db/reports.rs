//! Period summaries

use chrono::NaiveDateTime;

use super::Database;
use crate::error::Result;
use crate::models::UserId;
use crate::reports::{month_range, today_range, ExpenseSummary, MonthReport};

impl Database {
    /// Today's expenses as of `now`
    pub fn today_summary(&self, user_id: UserId, now: NaiveDateTime) -> Result<ExpenseSummary> {
        let (start, end) = today_range(now);
        let expenses = self.expenses_between(user_id, start, end)?;
        Ok(ExpenseSummary::new(start, end, expenses))
    }

    /// This month's expenses as of `now`
    pub fn month_summary(&self, user_id: UserId, now: NaiveDateTime) -> Result<ExpenseSummary> {
        let (start, end) = month_range(now);
        let expenses = self.expenses_between(user_id, start, end)?;
        Ok(ExpenseSummary::new(start, end, expenses))
    }

    /// This month's spending per category against the monthly limits
    pub fn month_report(&self, user_id: UserId, now: NaiveDateTime) -> Result<MonthReport> {
        let summary = self.month_summary(user_id, now)?;
        let categories = self.list_categories(user_id)?;
        Ok(MonthReport::new(summary, categories))
    }
}
