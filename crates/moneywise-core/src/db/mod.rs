//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `categories` - Category catalog per user
//! - `expenses` - Recording and listing expenses
//! - `reports` - Period summaries built from stored expenses
//! - `ledger` - `CategoryLookup` / `Recorder` on top of the above

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rust_decimal::Decimal;
use rusqlite::types::Type;
use tempfile::TempDir;
use tracing::info;

use crate::error::Result;

mod categories;
mod expenses;
mod ledger;
mod reports;


pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Timestamp layout used for `spent_at` columns
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Read a `DATETIME_FORMAT` text column
pub(crate) fn datetime_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a decimal stored as text
pub(crate) fn decimal_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    /// Keeps the directory of a throwaway database alive
    _temp_dir: Option<Arc<TempDir>>,
}

impl Database {
    /// Open (or create) the database at `path` and run migrations
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path.as_ref(), None)
    }

    /// Create a throwaway database in a temporary directory (for tests and demos)
    ///
    /// Uses a file rather than `:memory:` so every pooled connection sees the
    /// same data. The directory is removed when the last clone is dropped.
    pub fn in_memory() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("moneywise").tempdir()?;
        let path = dir.path().join("moneywise.db");
        Self::open(&path, Some(Arc::new(dir)))
    }

    fn open(path: &Path, temp_dir: Option<Arc<TempDir>>) -> Result<Self> {
        // Foreign keys are a per-connection setting
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.display().to_string(),
            _temp_dir: temp_dir,
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Categories, unique per user by normalized name
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                normalized_name TEXT NOT NULL,
                monthly_limit TEXT NOT NULL DEFAULT '0',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (user_id, normalized_name)
            );

            CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);

            -- Expenses; amounts are decimal text, spent_at is local time
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                amount TEXT NOT NULL,
                description TEXT,
                spent_at TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_user_spent ON expenses(user_id, spent_at);
            CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id);
            "#,
        )?;

        info!("Database migrations complete");
        Ok(())
    }
}
