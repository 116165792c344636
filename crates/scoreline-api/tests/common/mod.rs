use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use scoreline_api::{AppStateInner, router};
use scoreline_chain::LedgerMirror;
use scoreline_db::Database;

/// The full router over a throwaway database, driven in-process.
pub struct TestApp {
    router: Router,
    path: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mirror(LedgerMirror::disabled())
    }

    pub fn with_mirror(mirror: LedgerMirror) -> Self {
        let path = std::env::temp_dir().join(format!("scoreline_api_{}.db", Uuid::new_v4()));
        let db = Database::open(&path).expect("open test database");
        let state = Arc::new(AppStateInner { db, mirror });
        Self {
            router: router(state),
            path,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Create an account and return its profile id.
    pub async fn profile(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/accounts",
                serde_json::json!({"username": username, "email": format!("{}@example.com", username)}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}
