use std::path::PathBuf;
use std::time::Duration;

use scoreline_chain::{DEFAULT_METHOD, MirrorConfig};

/// Runtime configuration, read from the environment (and `.env` if present).
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// `None` when `SCORELINE_LEDGER_RPC_URL` is unset: mirroring disabled.
    pub mirror: Option<MirrorConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let db_path = std::env::var("SCORELINE_DB_PATH")
            .unwrap_or_else(|_| "scoreline.db".into())
            .into();
        let host = std::env::var("SCORELINE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("SCORELINE_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()?;

        let mirror = match std::env::var("SCORELINE_LEDGER_RPC_URL") {
            Ok(rpc_url) if !rpc_url.trim().is_empty() => {
                let timeout_secs: u64 = std::env::var("SCORELINE_LEDGER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10);
                Some(MirrorConfig {
                    rpc_url,
                    contract: std::env::var("SCORELINE_LEDGER_CONTRACT").unwrap_or_default(),
                    method: std::env::var("SCORELINE_LEDGER_METHOD")
                        .unwrap_or_else(|_| DEFAULT_METHOD.into()),
                    timeout: Duration::from_secs(timeout_secs),
                })
            }
            _ => None,
        };

        Ok(Self {
            db_path,
            host,
            port,
            mirror,
        })
    }
}
