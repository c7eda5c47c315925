//! In-memory ledger
//!
//! Keeps categories and expenses in process memory. Useful for unit tests and
//! development without a database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::{CategoryLookup, Recorder};
use crate::error::{Error, Result};
use crate::models::{normalize_category_name, Category, Expense, UserId};

#[derive(Default)]
struct LedgerState {
    categories: Vec<Category>,
    expenses: Vec<Expense>,
    next_id: i64,
}

/// In-memory category catalog and expense recorder
///
/// Clones share the same underlying state.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        // A panic while holding the lock leaves plain data behind; keep using it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a category for a user
    pub fn add_category(&self, user_id: UserId, name: &str, monthly_limit: Decimal) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation(
                "Category name cannot be empty.".to_string(),
            ));
        }
        let normalized_name = normalize_category_name(name);

        let mut state = self.lock();
        if state
            .categories
            .iter()
            .any(|c| c.user_id == user_id && c.normalized_name == normalized_name)
        {
            return Err(Error::Validation(format!(
                "Category \"{}\" already exists.",
                name
            )));
        }

        state.next_id += 1;
        let category = Category {
            id: state.next_id,
            user_id,
            name: name.to_string(),
            normalized_name,
            monthly_limit,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    /// Remove a category (its expenses stay behind)
    pub fn remove_category(&self, user_id: UserId, id: i64) -> bool {
        let mut state = self.lock();
        let before = state.categories.len();
        state
            .categories
            .retain(|c| !(c.user_id == user_id && c.id == id));
        state.categories.len() != before
    }

    /// Recorded expenses of a user, oldest first
    pub fn expenses(&self, user_id: UserId) -> Vec<Expense> {
        self.lock()
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CategoryLookup for MemoryLedger {
    async fn list(&self, user_id: UserId) -> Result<Vec<Category>> {
        Ok(self
            .lock()
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_name(&self, user_id: UserId, name: &str) -> Result<Option<Category>> {
        let normalized = normalize_category_name(name);
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.user_id == user_id && c.normalized_name == normalized)
            .cloned())
    }

    async fn get_by_id(&self, user_id: UserId, id: i64) -> Result<Option<Category>> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.user_id == user_id && c.id == id)
            .cloned())
    }
}

#[async_trait]
impl Recorder for MemoryLedger {
    async fn record(
        &self,
        user_id: UserId,
        amount: Decimal,
        category_id: i64,
        description: Option<&str>,
        spent_at: NaiveDateTime,
    ) -> Result<Expense> {
        let mut state = self.lock();
        let category_name = state
            .categories
            .iter()
            .find(|c| c.user_id == user_id && c.id == category_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| Error::NotFound(format!("category {}", category_id)))?;

        state.next_id += 1;
        let expense = Expense {
            id: state.next_id,
            user_id,
            category_id,
            category_name,
            amount,
            description: description.map(str::to_string),
            spent_at,
        };
        state.expenses.push(expense.clone());
        Ok(expense)
    }
}
