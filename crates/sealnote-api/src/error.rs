use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use sealnote_crypto::CipherError;

/// Request-level error taxonomy. Every variant is caught at the handler
/// boundary and rendered as `{"message": ...}` with its status code; the
/// process never terminates on a per-request error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client input missing or malformed → 400.
    #[error("{0}")]
    Validation(String),

    /// No usable bearer credential, or bad login credentials → 401.
    #[error("{0}")]
    Unauthenticated(String),

    /// The bearer credential failed signature or expiry checks → 403.
    #[error("invalid or expired token")]
    InvalidCredential,

    /// Authenticated, but not the owner of the referenced record → 403.
    #[error("not allowed to update this record")]
    Forbidden,

    /// The referenced record does not exist → 404.
    #[error("record not found")]
    NotFound,

    /// The ciphertext token cannot be decrypted → 400.
    #[error("{0}")]
    MalformedToken(String),

    /// Anything unexpected → 500. Details go to the log, not the client.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredential => StatusCode::FORBIDDEN,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MalformedToken(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("internal error: {err:#}");
        ApiError::Internal
    }
}

impl From<CipherError> for ApiError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::MalformedToken(_) => ApiError::MalformedToken(err.to_string()),
            // A key that passed startup validation cannot fail per-request.
            CipherError::Configuration(_) => {
                error!("codec configuration error after startup: {err}");
                ApiError::Internal
            }
        }
    }
}

/// Shared `spawn_blocking` join-error mapping for handlers.
pub(crate) fn join_error(err: tokio::task::JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", err);
    ApiError::Internal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unauthenticated("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::InvalidCredential.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MalformedToken("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn display_includes_message() {
        let e = ApiError::Validation("message is required".into());
        assert!(e.to_string().contains("message is required"));
    }

    #[test]
    fn malformed_token_carries_codec_detail() {
        let e = ApiError::from(CipherError::MalformedToken("missing ':' separator"));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert!(e.to_string().contains("missing ':' separator"));
    }
}
