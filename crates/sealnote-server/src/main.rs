use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use sealnote_api::{AppState, AppStateInner};
use sealnote_crypto::keys::SecretKey;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sealnote=debug,tower_http=debug".into()),
        )
        .init();

    // Config. The encryption key is validated here, once; a missing or
    // wrong-length key terminates startup instead of failing requests later.
    let secret_key = SecretKey::from_utf8(
        &std::env::var("SEALNOTE_ENCRYPTION_KEY")
            .context("SEALNOTE_ENCRYPTION_KEY is not set")?,
    )?;
    let jwt_secret =
        std::env::var("SEALNOTE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("SEALNOTE_DB_PATH").unwrap_or_else(|_| "sealnote.db".into());
    let host = std::env::var("SEALNOTE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SEALNOTE_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;

    // Init database
    let db = sealnote_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        secret_key,
    });

    let app = sealnote_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Sealnote server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
