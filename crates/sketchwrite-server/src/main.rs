use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use sketchwrite_api::AppState;
use sketchwrite_store::{MemoryStore, SqliteStore, Store, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchwrite=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("SKETCHWRITE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SKETCHWRITE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let backend = std::env::var("SKETCHWRITE_STORE").unwrap_or_else(|_| "sqlite".into());
    let db_path = std::env::var("SKETCHWRITE_DB_PATH").unwrap_or_else(|_| "sketchwrite.db".into());
    let upload_dir =
        PathBuf::from(std::env::var("SKETCHWRITE_UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
    let seed_enabled = std::env::var("SKETCHWRITE_SEED")
        .map(|v| v != "0" && v != "false")
        .unwrap_or(true);

    // One store handle for the whole process, injected into the API layer.
    let store: Arc<dyn Store> = match backend.as_str() {
        "memory" => {
            info!("Using in-memory store; contents are lost on shutdown");
            Arc::new(MemoryStore::new())
        }
        "sqlite" => Arc::new(SqliteStore::open(&PathBuf::from(&db_path))?),
        other => anyhow::bail!("unknown SKETCHWRITE_STORE backend '{other}'"),
    };

    // Sample content belongs to store initialization only; a populated
    // store is left untouched.
    if seed_enabled {
        seed::run_if_empty(store.as_ref())?;
    }

    tokio::fs::create_dir_all(&upload_dir).await?;

    let state = AppState {
        store,
        upload_dir: upload_dir.clone(),
    };

    let app = Router::new()
        .nest("/api", sketchwrite_api::router(state))
        .nest_service("/uploads", ServeDir::new(&upload_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!("Sketchwrite server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
