//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, parse_money)
//! - `categories` - Category management commands
//! - `expenses` - One-line entry and reports (recent, today, month)
//! - `chat` - Interactive guided entry
//! - `serve` - Web server command

pub mod categories;
pub mod chat;
pub mod core;
pub mod expenses;
pub mod serve;

// Re-export command functions for main.rs
pub use categories::*;
pub use chat::*;
pub use core::*;
pub use expenses::*;
pub use serve::*;
