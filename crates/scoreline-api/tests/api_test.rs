/// HTTP-level tests: request shapes, status mapping and error bodies.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    http::{Method, StatusCode},
    routing::post,
};
use serde_json::json;

use common::TestApp;
use scoreline_chain::{LedgerMirror, MirrorConfig};

#[tokio::test]
async fn health_is_ok() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn duplicate_username_is_409() {
    let app = TestApp::new();
    app.profile("alice").await;

    let (status, body) = app
        .post("/accounts", json!({"username": "alice", "email": "other@example.com"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DuplicateUsername");
}

#[tokio::test]
async fn match_and_tournament_flow() {
    let app = TestApp::new();
    let a = app.profile("alice").await;
    let b = app.profile("bob").await;
    let c = app.profile("carol").await;

    let (status, m) = app
        .post("/matches", json!({"player1": a, "player2": b, "score1": 5, "score2": 3}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(m["winner"], a.as_str());
    let match_id = m["id"].as_str().unwrap().to_string();

    let (_, alice) = app.get(&format!("/profiles/{}", a)).await;
    assert_eq!(alice["wins"], 1);
    assert_eq!(alice["matches_played"], 1);
    let (_, bob) = app.get(&format!("/profiles/{}", b)).await;
    assert_eq!(bob["losses"], 1);

    let (status, body) = app
        .post("/tournaments", json!({"match_ids": [match_id], "winner": c}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "WinnerNotParticipant");

    let (status, body) = app
        .post(
            "/tournaments",
            json!({"match_ids": [match_id], "winner": uuid::Uuid::new_v4()}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (status, t) = app
        .post("/tournaments", json!({"match_ids": [match_id], "winner": a}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(t["matches"], json!([match_id]));

    let (status, listed) = app.get("/tournaments?limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, matches) = app.get(&format!("/profiles/{}/matches", b)).await;
    assert_eq!(matches[0]["tournament"], t["id"]);
}

#[tokio::test]
async fn invalid_match_input_is_400() {
    let app = TestApp::new();
    let a = app.profile("alice").await;
    let b = app.profile("bob").await;

    let (status, body) = app
        .post("/matches", json!({"player1": a, "player2": a, "score1": 1, "score2": 0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidPlayers");

    let (status, body) = app
        .post("/matches", json!({"player1": a, "player2": b, "score1": -2, "score2": 0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidScore");

    let (status, body) = app.post("/tournaments", json!({"match_ids": [], "winner": a})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EmptyMatchSet");
}

#[tokio::test]
async fn drawn_match_winner_can_be_assigned_once() {
    let app = TestApp::new();
    let a = app.profile("alice").await;
    let b = app.profile("bob").await;

    let (_, m) = app
        .post("/matches", json!({"player1": a, "player2": b, "score1": 2, "score2": 2}))
        .await;
    assert!(m["winner"].is_null());
    let uri = format!("/matches/{}/winner", m["id"].as_str().unwrap());

    let (status, m) = app.send(Method::PUT, &uri, Some(json!({"winner": b}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(m["winner"], b.as_str());

    let (status, body) = app.send(Method::PUT, &uri, Some(json!({"winner": a}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "WinnerAlreadyAssigned");
}

#[tokio::test]
async fn unknown_ids_are_404() {
    let app = TestApp::new();
    let missing = uuid::Uuid::new_v4();

    for uri in [
        format!("/profiles/{}", missing),
        format!("/profiles/{}/matches", missing),
        format!("/matches/{}", missing),
        format!("/tournaments/{}", missing),
        format!("/chats/{}", missing),
        format!("/chats/{}/messages", missing),
    ] {
        let (status, body) = app.get(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"], "NotFound");
    }
}

#[tokio::test]
async fn friendship_endpoints() {
    let app = TestApp::new();
    let a = app.profile("alice").await;
    let b = app.profile("bob").await;

    let (status, body) = app.post("/friends", json!({"a": a, "b": a})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "SelfFriend");

    for pair in [json!({"a": a, "b": b}), json!({"a": b, "b": a})] {
        let (status, body) = app.post("/friends", pair).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    let (_, friends) = app.get(&format!("/profiles/{}/friends", a)).await;
    assert_eq!(friends, json!([{"id": b, "username": "bob"}]));
    let (_, check) = app.get(&format!("/friends/{}/{}", b, a)).await;
    assert_eq!(check["friends"], true);

    let (status, _) = app
        .send(Method::DELETE, "/friends", Some(json!({"a": a, "b": b})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, check) = app.get(&format!("/friends/{}/{}", a, b)).await;
    assert_eq!(check["friends"], false);
}

#[tokio::test]
async fn chat_endpoints() {
    let app = TestApp::new();
    let a = app.profile("alice").await;
    let b = app.profile("bob").await;
    let c = app.profile("carol").await;

    let (status, body) = app.post("/chats", json!({"participants": [a]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "TooFewParticipants");

    let (status, chat) = app.post("/chats", json!({"participants": [a, b]})).await;
    assert_eq!(status, StatusCode::CREATED);
    let chat_id = chat["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post("/messages", json!({"chat": chat_id, "sender": c, "content": "hi"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NotAParticipant");

    let (status, body) = app
        .post("/messages", json!({"chat": chat_id, "sender": c, "content": ""}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EmptyContent");

    let (status, msg) = app
        .post("/messages", json!({"chat": chat_id, "sender": a, "content": "gg"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(msg["sender_username"], "alice");

    let (_, history) = app.get(&format!("/chats/{}/messages?limit=10", chat_id)).await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (_, chats) = app.get(&format!("/profiles/{}/chats", b)).await;
    assert_eq!(chats[0]["id"], chat_id.as_str());

    let uri = format!("/chats/{}/participants/{}", chat_id, a);
    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NotAParticipant");
}

#[tokio::test]
async fn deleting_an_account_removes_the_profile() {
    let app = TestApp::new();
    let a = app.profile("alice").await;

    let uri = format!("/profiles/{}", a);
    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, all) = app.get("/profiles").await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn malformed_requests_get_structured_400s() {
    let app = TestApp::new();
    let a = app.profile("alice").await;
    let b = app.profile("bob").await;

    let cases = [
        app.post("/friends", json!({"a": a, "b": b, "extra": 1})).await,
        app.post("/friends", json!({"a": a, "b": "not-a-uuid"})).await,
        app.post("/matches", json!({"player1": a, "player2": b, "score1": 1})).await,
        app.post(
            "/matches",
            json!({"player1": a, "player2": b, "score1": 1.5, "score2": 0}),
        )
        .await,
        app.get("/profiles/xyz").await,
        app.get(&format!("/friends/{}/nope", a)).await,
        app.get("/tournaments?limit=lots").await,
    ];
    for (status, body) in cases {
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["error"], "ValidationError", "{}", body);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{}", body);
    }

    // nothing was written by the rejected requests
    let (_, friends) = app.get(&format!("/profiles/{}/friends", a)).await;
    assert_eq!(friends, json!([]));
    let (_, matches) = app.get(&format!("/profiles/{}/matches", a)).await;
    assert_eq!(matches, json!([]));
}

/// Ledger endpoint that always answers 500 and counts the attempts.
async fn start_broken_ledger() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = Router::new().route(
        "/",
        post(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "ledger down")
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/", addr), hits)
}

#[tokio::test]
async fn failing_mirror_does_not_fail_settlement() {
    let (url, hits) = start_broken_ledger().await;
    let mirror = LedgerMirror::new(MirrorConfig {
        rpc_url: url,
        contract: "0xc0ffee".into(),
        method: scoreline_chain::DEFAULT_METHOD.into(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();
    let app = TestApp::with_mirror(mirror);
    let a = app.profile("alice").await;
    let b = app.profile("bob").await;

    let (_, m) = app
        .post("/matches", json!({"player1": a, "player2": b, "score1": 2, "score2": 0}))
        .await;
    let (status, t) = app
        .post("/tournaments", json!({"match_ids": [m["id"]], "winner": a}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", t);

    // wait for the detached notification to reach the broken ledger
    for _ in 0..100 {
        if hits.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let (status, fetched) = app
        .get(&format!("/tournaments/{}", t["id"].as_str().unwrap()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, t);
}
