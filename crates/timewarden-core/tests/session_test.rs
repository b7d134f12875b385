#![allow(clippy::unwrap_used)]
// Integration tests for `Session` using wiremock: login, logout,
// startup restore, and centralized 401 handling.

use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use timewarden_api::{Client, TransportConfig};
use timewarden_core::session::CONNECTION_ERROR;
use timewarden_core::{CallError, NoticeKind, Page, Session, TokenStore, UiEvent};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    session: Arc<Session>,
    events: mpsc::UnboundedReceiver<UiEvent>,
    token_path: PathBuf,
    _dir: tempfile::TempDir,
}

impl Harness {
    fn drain(&mut self) -> Vec<UiEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

fn harness_for(base_url: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("token");
    let (tx, events) = mpsc::unbounded_channel();
    let client = Arc::new(Client::new(base_url, &TransportConfig::default()).unwrap());
    let session = Arc::new(Session::new(
        client,
        TokenStore::new(token_path.clone()),
        tx,
    ));
    Harness {
        session,
        events,
        token_path,
        _dir: dir,
    }
}

async fn setup() -> (MockServer, Harness) {
    let server = MockServer::start().await;
    let harness = harness_for(&server.uri());
    (server, harness)
}

fn token_with_exp(exp: i64) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"));
    format!("header.{payload}.signature")
}

fn valid_token() -> String {
    token_with_exp(Utc::now().timestamp() + 3600)
}

fn navigations(events: &[UiEvent]) -> Vec<Page> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Navigate(page) => Some(*page),
            _ => None,
        })
        .collect()
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn login_persists_token_and_lands_on_dashboard() {
    let (server, mut h) = setup().await;
    let token = valid_token();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "token": token})),
        )
        .mount(&server)
        .await;

    h.session.login("admin", "hunter2").await.unwrap();

    assert_eq!(std::fs::read_to_string(&h.token_path).unwrap(), token);
    assert!(h.session.api().credential().is_some());
    assert_eq!(h.session.identity().unwrap().as_str(), "admin");
    assert_eq!(navigations(&h.drain()), vec![Page::Dashboard]);
}

#[tokio::test]
async fn rejected_login_surfaces_server_message_and_stays_logged_out() {
    let (server, mut h) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let err = h.session.login("admin", "wrong").await.unwrap_err();

    assert_eq!(err, "Invalid credentials");
    assert!(!h.token_path.exists());
    assert!(h.session.api().credential().is_none());
    assert!(navigations(&h.drain()).is_empty());
}

#[tokio::test]
async fn unreachable_backend_fails_login_with_connection_toast() {
    // Port 9 (discard) refuses connections.
    let mut h = harness_for("http://127.0.0.1:9");

    let err = h.session.login("admin", "hunter2").await.unwrap_err();

    assert_eq!(err, "Login failed");
    let toasts: Vec<_> = h
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            UiEvent::Notify(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, NoticeKind::Error);
    assert_eq!(toasts[0].message, CONNECTION_ERROR);
}

// ── Startup restore ─────────────────────────────────────────────────

#[tokio::test]
async fn startup_with_accepted_token_restores_the_session() {
    let (server, mut h) = setup().await;
    let token = valid_token();
    std::fs::write(&h.token_path, &token).unwrap();

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .and(header("authorization", format!("Bearer {token}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "users": []})),
        )
        .mount(&server)
        .await;

    h.session.startup().await;

    assert_eq!(h.session.identity().unwrap().as_str(), "admin");
    assert_eq!(navigations(&h.drain()), vec![Page::Dashboard]);
}

#[tokio::test]
async fn startup_with_expired_token_discards_it_without_a_request() {
    let (server, mut h) = setup().await;
    std::fs::write(&h.token_path, token_with_exp(Utc::now().timestamp() - 60)).unwrap();

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    h.session.startup().await;

    assert!(!h.token_path.exists());
    assert_eq!(navigations(&h.drain()), vec![Page::Login]);
}

#[tokio::test]
async fn startup_without_a_token_lands_on_login() {
    let (_server, mut h) = setup().await;

    h.session.startup().await;

    assert_eq!(navigations(&h.drain()), vec![Page::Login]);
}

#[tokio::test]
async fn startup_probe_rejection_discards_the_token() {
    let (server, mut h) = setup().await;
    std::fs::write(&h.token_path, valid_token()).unwrap();

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    h.session.startup().await;

    assert!(!h.token_path.exists());
    assert!(h.session.api().credential().is_none());
    assert_eq!(navigations(&h.drain()), vec![Page::Login]);
}

// ── Settlement ──────────────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_call_forces_logout_once() {
    let (server, mut h) = setup().await;
    let token = valid_token();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "token": token})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    h.session.login("admin", "hunter2").await.unwrap();
    h.drain();

    let result = h.session.settle(h.session.api().dashboard().await);

    assert_eq!(result.unwrap_err(), CallError::LoggedOut);
    assert!(!h.token_path.exists());
    assert!(h.session.api().credential().is_none());
    assert!(h.session.identity().is_none());
    assert_eq!(navigations(&h.drain()), vec![Page::Login]);
}

#[tokio::test]
async fn semantic_rejection_keeps_the_session() {
    let (server, mut h) = setup().await;
    let token = valid_token();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "token": token})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "maintenance window"
        })))
        .mount(&server)
        .await;

    h.session.login("admin", "hunter2").await.unwrap();
    h.drain();

    let result = h.session.settle(h.session.api().dashboard().await);

    assert_eq!(
        result.unwrap_err(),
        CallError::Rejected("maintenance window".to_owned())
    );
    assert!(h.token_path.exists());
    assert!(h.session.api().credential().is_some());
    assert!(navigations(&h.drain()).is_empty());
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn logout_clears_credential_and_returns_to_login() {
    let (server, mut h) = setup().await;
    let token = valid_token();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "token": token})),
        )
        .mount(&server)
        .await;

    h.session.login("admin", "hunter2").await.unwrap();
    h.drain();

    h.session.logout();

    assert!(!h.token_path.exists());
    assert!(h.session.api().credential().is_none());
    assert!(h.session.identity().is_none());
    assert_eq!(navigations(&h.drain()), vec![Page::Login]);
}
