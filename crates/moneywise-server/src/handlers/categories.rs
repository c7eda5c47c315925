//! Category management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{AppError, AppState};
use moneywise_core::{Category, NewCategory, UserId};

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub monthly_limit: Decimal,
}

/// GET /api/users/:user_id/categories - List the user's categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.db.list_categories(user_id)?;
    Ok(Json(categories))
}

/// POST /api/users/:user_id/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state.db.create_category(
        user_id,
        &NewCategory {
            name: req.name,
            monthly_limit: req.monthly_limit,
        },
    )?;
    Ok((StatusCode::CREATED, Json(category)))
}
