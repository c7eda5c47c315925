//! Moneywise Core Library
//!
//! Shared functionality for the Moneywise expense tracker:
//! - Entity extraction from free-form expense messages
//! - Guided-entry dialog state machine with per-user sessions
//! - One-line `/add` quick entry
//! - SQLite storage for categories and expenses
//! - Daily and monthly spending reports
//! - Settings from file and environment

pub mod config;
pub mod db;
pub mod dialog;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod models;
pub mod quick_add;
pub mod reports;
pub mod session;

pub use config::Settings;
pub use db::Database;
pub use dialog::{Action, DialogController, DialogEvent, Prompt};
pub use error::{Error, Result};
pub use extract::{parse_amount, EntityExtractor};
pub use ledger::{CategoryLookup, MemoryLedger, Recorder};
pub use models::{Category, Draft, Expense, NewCategory, UserId};
pub use quick_add::{parse_quick_add, quick_add, QuickAdd};
pub use reports::{ExpenseSummary, LimitStatus, MonthReport};
pub use session::{MemorySessionStore, Session, SessionStore, Step};
