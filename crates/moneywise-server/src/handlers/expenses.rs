//! Expense entry and report handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, MAX_RECENT_LIMIT};
use moneywise_core::reports::{render_confirmation, render_month, render_recent, render_today};
use moneywise_core::{quick_add, Expense, ExpenseSummary, MonthReport, UserId};

/// Request body for a one-line entry
#[derive(Debug, Deserialize)]
pub struct QuickAddRequest {
    /// `/add <amount> <category> [description]`, the `/add` prefix is optional
    pub text: String,
}

/// A report with its rendered text
#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub text: String,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct RecordedExpense {
    pub expense: Expense,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct RecentExpenses {
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// POST /api/users/:user_id/expenses/quick - Record an expense from one line
pub async fn quick_add_expense(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Json(req): Json<QuickAddRequest>,
) -> Result<(StatusCode, Json<RecordedExpense>), AppError> {
    let now = Local::now().naive_local();
    let expense = quick_add(&state.db, &state.db, user_id, &req.text, now).await?;
    let text = render_confirmation(&expense, state.config.currency.as_deref());
    Ok((StatusCode::CREATED, Json(RecordedExpense { expense, text })))
}

/// GET /api/users/:user_id/expenses/recent - Most recent expenses first
pub async fn recent_expenses(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecentQuery>,
) -> Result<Json<Report<RecentExpenses>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(state.config.recent_limit)
        .clamp(1, MAX_RECENT_LIMIT);
    let expenses = state.db.list_recent_expenses(user_id, limit)?;
    let text = render_recent(&expenses, state.config.currency.as_deref());
    Ok(Json(Report {
        text,
        data: RecentExpenses { expenses },
    }))
}

/// GET /api/users/:user_id/expenses/today - Today's expenses and total
pub async fn today_report(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Report<ExpenseSummary>>, AppError> {
    let summary = state.db.today_summary(user_id, Local::now().naive_local())?;
    let text = render_today(&summary, state.config.currency.as_deref());
    Ok(Json(Report {
        text,
        data: summary,
    }))
}

/// GET /api/users/:user_id/expenses/month - Spending per category against limits
pub async fn month_report(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Report<MonthReport>>, AppError> {
    let report = state.db.month_report(user_id, Local::now().naive_local())?;
    let text = render_month(&report, state.config.currency.as_deref());
    Ok(Json(Report { text, data: report }))
}
