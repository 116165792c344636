/// Drives the mirror against a local JSON-RPC stub.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use uuid::Uuid;

use scoreline_chain::{LedgerMirror, MirrorConfig, NotifyError};

type Seen = Arc<Mutex<Vec<Value>>>;

async fn start_stub(reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route(
            "/",
            post(|State((seen, reply)): State<(Seen, Value)>, Json(body): Json<Value>| async move {
                seen.lock().unwrap().push(body);
                Json(reply)
            }),
        )
        .with_state((seen.clone(), reply));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/", addr), seen)
}

async fn start_failing_stub(status: StatusCode) -> String {
    let app = Router::new().route("/", post(move || async move { (status, "ledger unavailable") }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

fn mirror(url: String) -> LedgerMirror {
    LedgerMirror::new(MirrorConfig {
        rpc_url: url,
        contract: "0xc0ffee".into(),
        method: scoreline_chain::DEFAULT_METHOD.into(),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn settlement_is_sent_as_json_rpc() {
    let (url, seen) = start_stub(json!({"jsonrpc": "2.0", "id": 1, "result": "0xabc"})).await;
    let (tournament, winner) = (Uuid::new_v4(), Uuid::new_v4());

    mirror(url).notify_tournament_settled(tournament, winner).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let body = &seen[0];
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["method"], "add_tournament");
    assert_eq!(body["params"][0]["contract"], "0xc0ffee");
    assert_eq!(body["params"][0]["tournament_id"], tournament.to_string());
    assert_eq!(body["params"][0]["winner"], winner.to_string());
}

#[tokio::test]
async fn rpc_error_member_is_a_failure() {
    let (url, _) = start_stub(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": -32000, "message": "execution reverted"}
    }))
    .await;

    let err = mirror(url)
        .notify_tournament_settled(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::Rpc { code: -32000, .. }));
}

#[tokio::test]
async fn non_success_status_is_a_failure() {
    let url = start_failing_stub(StatusCode::SERVICE_UNAVAILABLE).await;

    let m = mirror(url);
    let err = m
        .notify_tournament_settled(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::Status(503)));

    m.spawn_notify(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn unreachable_endpoint_is_swallowed_by_spawn() {
    // grab a free port, then close it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let m = mirror(format!("http://{}/", addr));
    assert!(m.notify_tournament_settled(Uuid::new_v4(), Uuid::new_v4()).await.is_err());

    // the detached task logs and completes without panicking
    m.spawn_notify(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn disabled_mirror_accepts_everything() {
    let m = LedgerMirror::disabled();
    assert!(!m.is_enabled());
    m.notify_tournament_settled(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
}
