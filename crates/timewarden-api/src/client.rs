// Hand-crafted async HTTP client for the screen-time administration API.
//
// All endpoints live under one base URL and speak JSON. Every endpoint
// except /login is bearer-authenticated.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::token::Credential;
use crate::types::{
    Ack, LoginGrant, Roster, ScheduleUpdateRequest, SshStatus, SyncStatus, TimeAdjustmentRequest,
    UsageSeries, UserSummary,
};

// ── Transport ────────────────────────────────────────────────────────

/// Transport settings for building the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// Accept any TLS certificate (self-hosted backends are commonly
    /// self-signed).
    pub insecure: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            insecure: false,
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("timewarden/", env!("CARGO_PKG_VERSION")));

        if self.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(builder.build()?)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the screen-time administration API.
///
/// Holds the shared credential slot: many concurrent calls read it,
/// but it is written only by login, logout, and the session layer's
/// central 401 handler. `arc-swap` makes the reads lock-free; a read
/// racing a clear at worst sends one request with a just-revoked
/// credential, which the backend answers with 401 and the session
/// layer handles like any other.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    credential: ArcSwapOption<Credential>,
}

impl Client {
    /// Build a client for `base_url` (e.g. `https://host:5000/api`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::with_client(
            transport.build_client()?,
            normalize_base_url(base_url)?,
        ))
    }

    /// Wrap an existing `reqwest::Client` (used by tests).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            credential: ArcSwapOption::empty(),
        }
    }

    // ── Credential slot ──────────────────────────────────────────────

    pub fn set_credential(&self, credential: Credential) {
        self.credential.store(Some(Arc::new(credential)));
    }

    pub fn clear_credential(&self) {
        self.credential.store(None);
    }

    pub fn credential(&self) -> Option<Arc<Credential>> {
        self.credential.load_full()
    }

    /// The bearer value to attach, if a stored credential exists and is
    /// not expired. Expired or unparsable credentials are never sent.
    fn bearer(&self) -> Option<String> {
        let cred = self.credential.load_full()?;
        if cred.is_expired(Utc::now()) {
            return None;
        }
        Some(cred.expose().to_owned())
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"dashboard"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        // base_url always ends with '/', so joining relative paths works.
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let mut req = self.http.get(url);
        if let Some(token) = self.bearer() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let mut req = self.http.post(url).json(body);
        if let Some(token) = self.bearer() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    /// POST without a body. The backend's delete endpoint takes no
    /// payload but still expects a JSON content type.
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.post(path, &serde_json::json!({})).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Shared response path for every endpoint.
    ///
    /// 401 wins over everything, body included. Otherwise the body is
    /// read once and parsed twice: first for the `{success, message}`
    /// envelope (a `success: false` answer is a semantic rejection at
    /// any HTTP status), then for the caller's payload type.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        let body = resp.text().await?;

        let ack: Ack = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;
        if !ack.success {
            return Err(Error::Rejected {
                message: ack.message_or("request failed"),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Authentication ───────────────────────────────────────────────

    /// POST /login. Never attaches a stored credential -- a stale token
    /// must not shadow the submitted password.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            username: &'a str,
            password: &'a str,
        }

        let url = self.url("login")?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(&Body { username, password })
            .send()
            .await?;
        self.handle_response(resp).await
    }

    // ── Rosters ──────────────────────────────────────────────────────

    /// GET /dashboard. Doubles as the startup session probe.
    pub async fn dashboard(&self) -> Result<Vec<UserSummary>, Error> {
        let roster: Roster = self.get("dashboard").await?;
        Ok(roster.users)
    }

    /// GET /admin.
    pub async fn admin_users(&self) -> Result<Vec<UserSummary>, Error> {
        let roster: Roster = self.get("admin").await?;
        Ok(roster.users)
    }

    // ── Status probes ────────────────────────────────────────────────

    pub async fn ssh_status(&self) -> Result<SshStatus, Error> {
        self.get("ssh-status").await
    }

    pub async fn schedule_sync_status(&self, user_id: i64) -> Result<SyncStatus, Error> {
        self.get(&format!("schedule-sync-status/{user_id}")).await
    }

    pub async fn usage(&self, user_id: i64) -> Result<UsageSeries, Error> {
        self.get(&format!("user/{user_id}/usage")).await
    }

    // ── User management ──────────────────────────────────────────────

    pub async fn add_user(&self, username: &str, system_ip: &str) -> Result<Ack, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            username: &'a str,
            system_ip: &'a str,
        }

        self.post(
            "users/add",
            &Body {
                username,
                system_ip,
            },
        )
        .await
    }

    pub async fn validate_user(&self, user_id: i64) -> Result<Ack, Error> {
        self.get(&format!("users/validate/{user_id}")).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<Ack, Error> {
        self.post_empty(&format!("users/delete/{user_id}")).await
    }

    // ── Time & schedule mutations ────────────────────────────────────

    pub async fn modify_time(&self, req: &TimeAdjustmentRequest) -> Result<Ack, Error> {
        self.post("modify-time", req).await
    }

    pub async fn update_schedule(&self, req: &ScheduleUpdateRequest) -> Result<Ack, Error> {
        self.post("schedule/update", req).await
    }

    // ── Account ──────────────────────────────────────────────────────

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Ack, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            current_password: &'a str,
            new_password: &'a str,
            confirm_password: &'a str,
        }

        self.post(
            "change-password",
            &Body {
                current_password,
                new_password,
                confirm_password,
            },
        )
        .await
    }
}

/// Ensure the base URL ends with '/' so relative joins append instead
/// of replacing the last path segment.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// The leading slice of an unreadable body for error messages, cut on
/// a char boundary so a multibyte body can never panic the client.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = normalize_base_url("http://localhost:5000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/");
        assert_eq!(
            url.join("schedule-sync-status/3").unwrap().as_str(),
            "http://localhost:5000/api/schedule-sync-status/3"
        );
    }

    #[test]
    fn base_url_with_trailing_slash_unchanged() {
        let url = normalize_base_url("http://localhost:5000/api/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/");
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let body = "a".repeat(300);
        assert_eq!(preview(&body).len(), 200);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn preview_backs_off_a_multibyte_boundary() {
        // Byte 200 lands inside the 'é' (bytes 199..201).
        let body = format!("{}é trailing text", "a".repeat(199));
        let cut = preview(&body);
        assert_eq!(cut.len(), 199);
        assert!(body.starts_with(cut));
    }
}
