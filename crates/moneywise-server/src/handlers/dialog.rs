//! Guided-entry dialog transport

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use moneywise_core::{DialogEvent, Prompt, UserId};

/// POST /api/users/:user_id/dialog - Feed one event to the user's dialog
///
/// The body is a tagged event, e.g. `{"type": "free_text", "text": "taxi 2500"}`
/// or `{"type": "category_chosen", "category_id": 3}`.
pub async fn post_dialog_event(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Json(event): Json<DialogEvent>,
) -> Result<Json<Prompt>, AppError> {
    let prompt = state.dialog.handle(user_id, event).await?;
    Ok(Json(prompt))
}
