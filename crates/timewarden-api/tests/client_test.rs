#![allow(clippy::unwrap_used)]
// Integration tests for `Client` using wiremock.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use timewarden_api::{Client, Credential, Day, Error, Operation, TimeAdjustmentRequest};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api/", server.uri())).unwrap();
    let client = Client::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

/// A structurally valid bearer token expiring at `exp` (epoch seconds).
fn make_token(exp: i64) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"));
    format!("header.{payload}.signature")
}

fn far_future() -> i64 {
    chrono::Utc::now().timestamp() + 3_600
}

fn has_auth_header(req: &Request) -> bool {
    req.headers.contains_key("authorization")
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_returns_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_partial_json(json!({"username": "admin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "abc.def.ghi"
        })))
        .mount(&server)
        .await;

    let grant = client.login("admin", "hunter2").await.unwrap();
    assert_eq!(grant.token, "abc.def.ghi");
}

#[tokio::test]
async fn test_login_failure_carries_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let result = client.login("admin", "wrong").await;

    match result {
        Err(Error::Rejected { ref message }) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected Rejected error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_never_sends_stored_credential() {
    let (server, client) = setup().await;
    client.set_credential(Credential::new(make_token(far_future())));

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "new.token.here"
        })))
        .mount(&server)
        .await;

    client.login("admin", "pw").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(
        !has_auth_header(&requests[0]),
        "login must not carry a bearer header"
    );
}

// ── Bearer attachment ───────────────────────────────────────────────

#[tokio::test]
async fn test_valid_credential_attached_as_bearer() {
    let (server, client) = setup().await;
    let token = make_token(far_future());
    client.set_credential(Credential::new(token.clone()));

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .and(header("authorization", format!("Bearer {token}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "users": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client.dashboard().await.unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_expired_credential_not_attached() {
    let (server, client) = setup().await;
    client.set_credential(Credential::new(make_token(1_000)));

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "users": []
        })))
        .mount(&server)
        .await;

    client.dashboard().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(
        !has_auth_header(&requests[0]),
        "expired credential must not be sent"
    );
}

#[tokio::test]
async fn test_malformed_credential_not_attached() {
    let (server, client) = setup().await;
    client.set_credential(Credential::new("not-a-real-token"));

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "users": []
        })))
        .mount(&server)
        .await;

    client.dashboard().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!has_auth_header(&requests[0]));
}

// ── 401 handling ────────────────────────────────────────────────────

#[tokio::test]
async fn test_401_maps_to_unauthorized_regardless_of_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": true,
            "users": [{"id": 1, "username": "kid", "system_ip": "10.0.0.2"}]
        })))
        .mount(&server)
        .await;

    let result = client.dashboard().await;
    assert!(
        matches!(result, Err(Error::Unauthorized)),
        "expected Unauthorized, got: {result:?}"
    );
}

// ── Payload parsing ─────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboard_roster_parses() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "users": [{
                "id": 7,
                "username": "alex",
                "system_ip": "192.168.1.50",
                "time_left": "1h 30m",
                "last_checked": "2026-08-20 19:02",
                "pending_schedule": true
            }]
        })))
        .mount(&server)
        .await;

    let users = client.dashboard().await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, 7);
    assert_eq!(users[0].username, "alex");
    assert_eq!(users[0].time_left.as_deref(), Some("1h 30m"));
    assert!(users[0].pending_schedule);
    assert!(users[0].pending_adjustment.is_none());
}

#[tokio::test]
async fn test_sync_status_with_schedule_parses() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/schedule-sync-status/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "is_synced": false,
            "last_synced": "2026-08-19 08:00",
            "schedule": {
                "hours": {"monday": 2.0, "saturday": 4.5},
                "intervals": {"monday": {"start_time": "15:00", "end_time": "19:00"}}
            }
        })))
        .mount(&server)
        .await;

    let status = client.schedule_sync_status(7).await.unwrap();

    assert!(!status.is_synced);
    let schedule = status.schedule.unwrap();
    assert!((schedule.hours_for(Day::Saturday) - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_garbage_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ssh-status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let result = client.ssh_status().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization, got: {result:?}"
    );
}

#[tokio::test]
async fn test_long_multibyte_garbage_body_is_an_error_not_a_panic() {
    let (server, client) = setup().await;

    // Byte 200 of this body falls inside the 'é'.
    let body = format!("{}é and then some more of the gateway's error page", "a".repeat(199));
    Mock::given(method("GET"))
        .and(path("/api/ssh-status"))
        .respond_with(ResponseTemplate::new(502).set_body_string(body))
        .mount(&server)
        .await;

    let result = client.ssh_status().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization, got: {result:?}"
    );
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_modify_time_wire_format() {
    let (server, client) = setup().await;
    client.set_credential(Credential::new(make_token(far_future())));

    Mock::given(method("POST"))
        .and(path("/api/modify-time"))
        .and(body_partial_json(json!({
            "user_id": 7,
            "operation": "-",
            "seconds": 1800
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Time adjusted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client
        .modify_time(&TimeAdjustmentRequest {
            user_id: 7,
            operation: Operation::Subtract,
            seconds: 1800,
        })
        .await
        .unwrap();

    assert_eq!(ack.message.as_deref(), Some("Time adjusted"));
}

#[tokio::test]
async fn test_add_user_rejection_surfaces_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/users/add"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "User already exists"
        })))
        .mount(&server)
        .await;

    let result = client.add_user("alex", "192.168.1.50").await;
    assert_eq!(
        result.unwrap_err().rejection_message(),
        Some("User already exists")
    );
}

#[tokio::test]
async fn test_transport_failure_is_connection_error() {
    // Port 9 (discard) — nothing is listening.
    let client = Client::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9/api/").unwrap(),
    );

    let err = client.dashboard().await.unwrap_err();
    assert!(err.is_connection());
    assert!(!err.is_unauthorized());
}
