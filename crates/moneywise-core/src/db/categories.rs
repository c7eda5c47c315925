//! Category operations

use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;
use tracing::debug;

use super::{decimal_column, Database};
use crate::error::{Error, Result};
use crate::models::{normalize_category_name, Category, NewCategory, UserId};

const CATEGORY_COLUMNS: &str = "id, user_id, name, normalized_name, monthly_limit";

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        normalized_name: row.get(3)?,
        monthly_limit: decimal_column(row, 4)?,
    })
}

impl Database {
    /// Create a category for a user
    ///
    /// Names are unique per user after normalization.
    pub fn create_category(&self, user_id: UserId, new: &NewCategory) -> Result<Category> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(Error::Validation(
                "Category name cannot be empty.".to_string(),
            ));
        }
        if new.monthly_limit < Decimal::ZERO {
            return Err(Error::Validation(
                "The monthly limit cannot be negative.".to_string(),
            ));
        }
        let normalized_name = normalize_category_name(name);

        if self.find_category_by_name(user_id, name)?.is_some() {
            return Err(Error::Validation(format!(
                "Category \"{}\" already exists.",
                name
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (user_id, name, normalized_name, monthly_limit) VALUES (?, ?, ?, ?)",
            params![user_id, name, normalized_name, new.monthly_limit.to_string()],
        )?;
        let id = conn.last_insert_rowid();
        debug!(user_id, id, "Created category '{}'", name);

        Ok(Category {
            id,
            user_id,
            name: name.to_string(),
            normalized_name,
            monthly_limit: new.monthly_limit,
        })
    }

    /// List a user's categories by name
    pub fn list_categories(&self, user_id: UserId) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE user_id = ? ORDER BY normalized_name",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map(params![user_id], category_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a category by ID, only if it belongs to the user
    pub fn get_category(&self, user_id: UserId, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categories WHERE id = ? AND user_id = ?",
                    CATEGORY_COLUMNS
                ),
                params![id, user_id],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    /// Find a category by name (trimmed, case-insensitive)
    pub fn find_category_by_name(&self, user_id: UserId, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categories WHERE user_id = ? AND normalized_name = ?",
                    CATEGORY_COLUMNS
                ),
                params![user_id, normalize_category_name(name)],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    /// Change a category's monthly limit
    pub fn set_category_limit(&self, user_id: UserId, id: i64, monthly_limit: Decimal) -> Result<()> {
        if monthly_limit < Decimal::ZERO {
            return Err(Error::Validation(
                "The monthly limit cannot be negative.".to_string(),
            ));
        }
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE categories SET monthly_limit = ? WHERE id = ? AND user_id = ?",
            params![monthly_limit.to_string(), id, user_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("category {}", id)));
        }
        Ok(())
    }

    /// Delete a category together with its expenses
    pub fn delete_category(&self, user_id: UserId, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM categories WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("category {}", id)));
        }
        debug!(user_id, id, "Deleted category");
        Ok(())
    }
}
