//! Collaborator traits backed by SQLite

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::Database;
use crate::error::Result;
use crate::ledger::{CategoryLookup, Recorder};
use crate::models::{Category, Expense, UserId};

#[async_trait]
impl CategoryLookup for Database {
    async fn list(&self, user_id: UserId) -> Result<Vec<Category>> {
        self.list_categories(user_id)
    }

    async fn find_by_name(&self, user_id: UserId, name: &str) -> Result<Option<Category>> {
        self.find_category_by_name(user_id, name)
    }

    async fn get_by_id(&self, user_id: UserId, id: i64) -> Result<Option<Category>> {
        self.get_category(user_id, id)
    }
}

#[async_trait]
impl Recorder for Database {
    async fn record(
        &self,
        user_id: UserId,
        amount: Decimal,
        category_id: i64,
        description: Option<&str>,
        spent_at: NaiveDateTime,
    ) -> Result<Expense> {
        self.add_expense(user_id, amount, category_id, description, spent_at)
    }
}
