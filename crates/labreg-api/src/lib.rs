//! # labreg-api - Axum API Service for the Laboratory Registry
//!
//! ## API Surface
//!
//! | Path                  | Module               | Purpose                    |
//! |-----------------------|----------------------|----------------------------|
//! | `/v1/users`           | [`routes::users`]    | Register a user            |
//! | `/v1/users/:id`       | [`routes::users`]    | Fetch a user               |
//! | `/openapi.json`       | [`openapi`]          | Generated OpenAPI document |
//! | `/health/liveness`    | this module          | Process is up              |
//! | `/health/readiness`   | this module          | Database reachable         |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CatchPanicLayer → Handler
//! ```
//!
//! Every error, including unknown routes and handler panics, is returned as
//! the JSON body defined in [`error::ErrorBody`].

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod password;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::users::router())
        .merge(openapi::router())
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .fallback(not_found)
        .layer(middleware::panic::layer())
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

/// Liveness probe - always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe - 200 when the database (if configured) answers.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, AppError> {
    if let Some(pool) = &state.db_pool {
        db::ping(pool)
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("database unreachable: {e}")))?;
    }
    Ok("ready")
}

/// Fallback for unmatched routes.
async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
