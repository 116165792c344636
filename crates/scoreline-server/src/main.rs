mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use scoreline_api::{AppState, AppStateInner};
use scoreline_chain::LedgerMirror;
use scoreline_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scoreline=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;

    let mirror = match config.mirror {
        Some(mirror_config) => {
            info!("Mirroring settlements to {}", mirror_config.rpc_url);
            LedgerMirror::new(mirror_config)?
        }
        None => {
            info!("SCORELINE_LEDGER_RPC_URL unset, settlement mirroring disabled");
            LedgerMirror::disabled()
        }
    };

    let state: AppState = Arc::new(AppStateInner { db, mirror });

    let app = scoreline_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Scoreline listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
