//! Moneywise Web Server
//!
//! Axum-based JSON API for the Moneywise expense tracker. The dialog
//! endpoint is a transport for the guided-entry state machine: clients post
//! `DialogEvent`s and render the returned prompt and actions however they
//! like.
//!
//! Routes (all under `/api`):
//! - `POST /users/:user_id/dialog` - Feed one dialog event
//! - `GET|POST /users/:user_id/categories` - List / create categories
//! - `POST /users/:user_id/expenses/quick` - One-line `/add` entry
//! - `GET /users/:user_id/expenses/recent|today|month` - Reports

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use moneywise_core::{Database, DialogController, MemorySessionStore};

mod handlers;

/// Maximum number of expenses a single "recent" request may ask for
pub const MAX_RECENT_LIMIT: usize = 100;

/// Dialog controller over SQLite with process-local sessions
pub type Dialog = DialogController<Database, Database, MemorySessionStore>;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Label appended to amounts in rendered text
    pub currency: Option<String>,
    /// Default size of the "recent" report
    pub recent_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            currency: None,
            recent_limit: 10,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub dialog: Dialog,
    pub config: ServerConfig,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig) -> anyhow::Result<Router> {
    let dialog = DialogController::new(db.clone(), db.clone(), MemorySessionStore::new())?
        .with_currency(config.currency.clone());

    let state = Arc::new(AppState { db, dialog, config });

    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/users/:user_id/dialog", post(handlers::post_dialog_event))
        .route(
            "/users/:user_id/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/users/:user_id/expenses/quick",
            post(handlers::quick_add_expense),
        )
        .route(
            "/users/:user_id/expenses/recent",
            get(handlers::recent_expenses),
        )
        .route("/users/:user_id/expenses/today", get(handlers::today_report))
        .route("/users/:user_id/expenses/month", get(handlers::month_report));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(db, config)?;
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // User-facing core errors keep their message
        match err.downcast_ref::<moneywise_core::Error>() {
            Some(moneywise_core::Error::Validation(msg)) => return Self::bad_request(msg),
            Some(e @ moneywise_core::Error::NotFound(_)) => return Self::not_found(&e.to_string()),
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
