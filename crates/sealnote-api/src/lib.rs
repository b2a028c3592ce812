pub mod auth;
pub mod error;
pub mod middleware;
pub mod records;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use sealnote_crypto::keys::SecretKey;
use sealnote_db::Database;

pub type AppState = Arc<AppStateInner>;

/// Shared, immutable state: the secrets are fixed at startup, the database
/// is the only mutable collaborator.
pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub secret_key: SecretKey,
}

/// Assemble the API router. Register, login and the user listing are public;
/// everything touching records sits behind the auth middleware.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/users/register", post(auth::register))
        .route("/api/users/login", post(auth::login))
        .route("/api/users", get(auth::list_users))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/encrypt", post(records::encrypt))
        .route("/api/decrypt", post(records::decrypt))
        .route("/api/messages", get(records::history))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    public_routes.merge(protected_routes)
}

/// SQLite column defaults store "YYYY-MM-DD HH:MM:SS" without a timezone;
/// rows written by handlers carry RFC 3339. Accept both.
pub(crate) fn parse_timestamp(raw: &str, context_id: &str) -> chrono::DateTime<chrono::Utc> {
    raw.parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::warn!("Corrupt created_at '{}' on '{}': {}", raw, context_id, e);
            chrono::DateTime::default()
        })
}
