use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use tracing::warn;
use uuid::Uuid;

use sealnote_crypto::codec;
use sealnote_db::models::RecordRow;
use sealnote_types::api::{
    Claims, DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, RecordResponse,
};

use crate::error::{ApiError, join_error};
use crate::{AppState, parse_timestamp};

const HISTORY_LIMIT: u32 = 10;

pub async fn encrypt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<EncryptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.message.is_empty() {
        return Err(ApiError::Validation("message is required".into()));
    }

    let ciphertext = codec::encode(&req.message, &state.secret_key);
    let record_id = Uuid::new_v4();
    // Microsecond RFC 3339 keeps history ordering stable across requests
    // landing in the same wall-clock second.
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    // Run blocking DB insert off the async runtime
    let db = state.clone();
    let owner_id = claims.sub.to_string();
    let stored_ciphertext = ciphertext.clone();
    tokio::task::spawn_blocking(move || {
        db.db.create_record(
            &record_id.to_string(),
            &owner_id,
            &req.message,
            &stored_ciphertext,
            &created_at,
        )
    })
    .await
    .map_err(join_error)??;

    Ok(Json(EncryptResponse {
        ciphertext,
        record_id,
    }))
}

pub async fn decrypt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DecryptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.ciphertext.is_empty() {
        return Err(ApiError::Validation("ciphertext is required".into()));
    }

    let plaintext = codec::decode(&req.ciphertext, &state.secret_key)?;

    // A decode may reference the record it came from; if it does, the audit
    // trail is updated for the owner only. Without a record id the decode
    // still succeeds and nothing is written.
    if let Some(record_id) = req.record_id {
        let db = state.clone();
        let rid = record_id.to_string();
        let owner_id = claims.sub.to_string();
        let decoded = plaintext.clone();
        tokio::task::spawn_blocking(move || {
            let record = db
                .db
                .get_record(&rid)
                .map_err(ApiError::from)?
                .ok_or(ApiError::NotFound)?;
            if record.owner_id != owner_id {
                return Err(ApiError::Forbidden);
            }
            db.db.set_last_decoded(&rid, &decoded).map_err(ApiError::from)
        })
        .await
        .map_err(join_error)??;
    }

    Ok(Json(DecryptResponse { plaintext }))
}

pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let owner_id = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || {
        db.db.list_records_by_owner(&owner_id, HISTORY_LIMIT)
    })
    .await
    .map_err(join_error)??;

    let records: Vec<RecordResponse> = rows.into_iter().map(record_response).collect();
    Ok(Json(records))
}

fn record_response(row: RecordRow) -> RecordResponse {
    let created_at = parse_timestamp(&row.created_at, &row.id);
    RecordResponse {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt record id '{}': {}", row.id, e);
            Uuid::default()
        }),
        owner_id: row.owner_id.parse().unwrap_or_else(|e| {
            warn!("Corrupt owner_id '{}' on record '{}': {}", row.owner_id, row.id, e);
            Uuid::default()
        }),
        plaintext: row.plaintext,
        ciphertext: row.ciphertext,
        last_decoded: row.last_decoded,
        created_at,
    }
}
