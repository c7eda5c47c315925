//! Collaborator seams for category lookups and expense recording
//!
//! The dialog never talks to storage directly. It reaches categories through
//! [`CategoryLookup`] and commits finished expenses through [`Recorder`].
//!
//! # Implementations
//!
//! - `Database` (SQLite, see `crate::db`): persistent storage
//! - [`MemoryLedger`]: in-process maps, for tests and demos

mod memory;

pub use memory::MemoryLedger;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{Category, Expense, UserId};

/// Read access to a user's category catalog
///
/// Implementations must be Send + Sync so one instance can serve all users.
#[async_trait]
pub trait CategoryLookup: Send + Sync {
    /// All categories of the user, in display order
    async fn list(&self, user_id: UserId) -> Result<Vec<Category>>;

    /// Category by name, compared after normalization (trimmed, lowercased)
    async fn find_by_name(&self, user_id: UserId, name: &str) -> Result<Option<Category>>;

    /// Category by id, only if it belongs to the user
    async fn get_by_id(&self, user_id: UserId, id: i64) -> Result<Option<Category>>;
}

/// Commits finished expenses
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Store an expense
    ///
    /// Fails with `Error::NotFound` when `category_id` no longer resolves for the user.
    async fn record(
        &self,
        user_id: UserId,
        amount: Decimal,
        category_id: i64,
        description: Option<&str>,
        spent_at: NaiveDateTime,
    ) -> Result<Expense>;
}
