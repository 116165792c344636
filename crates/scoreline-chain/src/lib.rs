//! Best-effort mirroring of tournament settlements to an external
//! append-only ledger (a smart contract behind a JSON-RPC endpoint).
//!
//! Nothing here can fail a settlement: callers use
//! [`LedgerMirror::spawn_notify`], which logs failures and moves on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_METHOD: &str = "add_tournament";

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub rpc_url: String,
    pub contract: String,
    pub method: String,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("ledger RPC transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ledger RPC returned HTTP {0}")]
    Status(u16),

    #[error("ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// Handle to the mirror. Cheap to clone; a disabled mirror accepts every
/// notification and does nothing.
#[derive(Clone, Default)]
pub struct LedgerMirror {
    inner: Option<Arc<RpcMirror>>,
}

struct RpcMirror {
    client: reqwest::Client,
    config: MirrorConfig,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: [SettlementParams<'a>; 1],
}

#[derive(Serialize)]
struct SettlementParams<'a> {
    contract: &'a str,
    tournament_id: Uuid,
    winner: Uuid,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl LedgerMirror {
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn new(config: MirrorConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            inner: Some(Arc::new(RpcMirror {
                client,
                config,
                next_id: AtomicU64::new(1),
            })),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Record a settlement on the external ledger and wait for the answer.
    pub async fn notify_tournament_settled(
        &self,
        tournament_id: Uuid,
        winner: Uuid,
    ) -> Result<(), NotifyError> {
        let Some(rpc) = &self.inner else {
            debug!("Ledger mirror disabled, not mirroring tournament {}", tournament_id);
            return Ok(());
        };

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: rpc.next_id.fetch_add(1, Ordering::Relaxed),
            method: &rpc.config.method,
            params: [SettlementParams {
                contract: &rpc.config.contract,
                tournament_id,
                winner,
            }],
        };

        let resp = rpc
            .client
            .post(&rpc.config.rpc_url)
            .json(&request)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(NotifyError::Status(resp.status().as_u16()));
        }

        let body: RpcResponse = resp.json().await?;
        if let Some(err) = body.error {
            return Err(NotifyError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        debug!(
            "Mirrored tournament {} (winner {}), result {:?}",
            tournament_id, winner, body.result
        );
        Ok(())
    }

    /// Fire-and-forget variant. Must be called from within a tokio runtime.
    pub fn spawn_notify(&self, tournament_id: Uuid, winner: Uuid) -> JoinHandle<()> {
        let mirror = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mirror.notify_tournament_settled(tournament_id, winner).await {
                warn!("Failed to mirror tournament {} to ledger: {}", tournament_id, e);
            }
        })
    }
}
