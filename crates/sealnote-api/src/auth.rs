use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, warn};
use uuid::Uuid;

use sealnote_db::models::UserRow;
use sealnote_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserSummary,
};

use crate::error::{ApiError, join_error};
use crate::{AppState, parse_timestamp};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "name, email and password are required".into(),
        ));
    }

    // Check if the email is taken
    let db = state.clone();
    let email = req.email.clone();
    let existing = tokio::task::spawn_blocking(move || db.db.get_user_by_email(&email))
        .await
        .map_err(join_error)??;
    if existing.is_some() {
        return Err(ApiError::Validation("user already exists".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("password hashing failed: {}", e);
            ApiError::Internal
        })?
        .to_string();

    let user_id = Uuid::new_v4();

    let db = state.clone();
    tokio::task::spawn_blocking(move || {
        db.db
            .create_user(&user_id.to_string(), &req.name, &req.email, &password_hash)
    })
    .await
    .map_err(join_error)??;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "user registered successfully".into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("email and password are required".into()));
    }

    let db = state.clone();
    let email = req.email.clone();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_email(&email))
        .await
        .map_err(join_error)??
        .ok_or_else(|| ApiError::Unauthenticated("invalid credentials".into()))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(|e| {
        error!("stored password hash unparsable for '{}': {}", user.id, e);
        ApiError::Internal
    })?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthenticated("invalid credentials".into()))?;

    let user_id: Uuid = user.id.parse().map_err(|e| {
        error!("corrupt user id '{}': {}", user.id, e);
        ApiError::Internal
    })?;

    let token = create_token(&state.jwt_secret, user_id, &user.email).map_err(ApiError::from)?;

    Ok(Json(LoginResponse {
        token,
        user: user_summary(user),
    }))
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_users())
        .await
        .map_err(join_error)??;

    let users: Vec<UserSummary> = rows.into_iter().map(user_summary).collect();
    Ok(Json(users))
}

fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(24)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Project a user row into its public shape. The password hash never leaves
/// the database layer through this path.
fn user_summary(row: UserRow) -> UserSummary {
    let created_at = parse_timestamp(&row.created_at, &row.id);
    UserSummary {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt user id '{}': {}", row.id, e);
            Uuid::default()
        }),
        name: row.name,
        email: row.email,
        created_at,
    }
}
