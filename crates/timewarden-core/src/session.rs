//! Session lifecycle: login, logout, startup restore, and the single
//! place where API call outcomes turn into navigation and toasts.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use thiserror::Error;
use timewarden_api::{Client, Credential};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::event::{Notice, UiEvent};
use crate::page::Page;
use crate::token_store::TokenStore;

/// Shown whenever a call fails to reach the backend at all.
pub const CONNECTION_ERROR: &str =
    "Connection error. Please check if the backend server is running.";

/// What a settled API call can fail with, from the caller's point of
/// view. Side effects (toast, redirect, credential discard) have
/// already happened by the time one of these is returned; callers only
/// decide whether to keep or drop their in-progress view state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallError {
    /// The backend was unreachable or answered with something
    /// unreadable. A connection toast has been shown.
    #[error("backend unreachable")]
    Offline,
    /// The backend answered 401. The credential is gone and the UI has
    /// been redirected to the login page.
    #[error("session expired")]
    LoggedOut,
    /// The backend understood the request and said no.
    #[error("{0}")]
    Rejected(String),
}

/// Owns authentication state and the UI event channel.
///
/// Every API result flows through [`Session::settle`], so 401 handling
/// lives in exactly one place: whichever concurrent call observes it
/// first discards the credential and redirects, and the rest become
/// no-ops against an already-empty slot.
pub struct Session {
    client: Arc<Client>,
    store: TokenStore,
    events: mpsc::UnboundedSender<UiEvent>,
    identity: ArcSwapOption<String>,
}

impl Session {
    pub fn new(
        client: Arc<Client>,
        store: TokenStore,
        events: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            client,
            store,
            events,
            identity: ArcSwapOption::empty(),
        }
    }

    pub fn api(&self) -> &Client {
        &self.client
    }

    /// The logged-in account name, if any.
    pub fn identity(&self) -> Option<Arc<String>> {
        self.identity.load_full()
    }

    pub fn notify(&self, notice: Notice) {
        // A closed channel means the UI loop is gone; nothing to do.
        let _ = self.events.send(UiEvent::Notify(notice));
    }

    pub fn send(&self, event: UiEvent) {
        let _ = self.events.send(event);
    }

    fn navigate(&self, page: Page) {
        let _ = self.events.send(UiEvent::Navigate(page));
    }

    // ── Call settlement ──────────────────────────────────────────────

    /// Apply the session-wide consequences of an API result.
    ///
    /// 401 discards the credential and redirects to login. Transport
    /// and decode failures raise the connection toast. Semantic
    /// rejections pass through untouched for the caller to present.
    pub fn settle<T>(&self, result: Result<T, timewarden_api::Error>) -> Result<T, CallError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) if e.is_unauthorized() => {
                info!("session rejected by backend, returning to login");
                self.discard();
                self.navigate(Page::Login);
                Err(CallError::LoggedOut)
            }
            Err(timewarden_api::Error::Rejected { message }) => Err(CallError::Rejected(message)),
            Err(e) => {
                warn!(error = %e, "backend call failed");
                self.notify(Notice::error(CONNECTION_ERROR));
                Err(CallError::Offline)
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Decide the landing page from persisted state.
    ///
    /// A stored, unexpired credential is only trusted after the backend
    /// accepts it for a roster fetch; anything less lands on login.
    pub async fn startup(&self) {
        let Some(credential) = self.store.load() else {
            self.navigate(Page::Login);
            return;
        };
        if credential.is_expired(Utc::now()) {
            info!("stored credential expired, discarding");
            self.store.clear();
            self.navigate(Page::Login);
            return;
        }

        self.client.set_credential(credential);
        match self.settle(self.client.dashboard().await) {
            Ok(_) => {
                // The backend does not echo the account name back, so a
                // restored session reports the only account that exists.
                self.identity.store(Some(Arc::new("admin".to_owned())));
                self.navigate(Page::Dashboard);
            }
            // settle already discarded and redirected.
            Err(CallError::LoggedOut) => {}
            // An unverifiable credential is not trusted across restarts.
            Err(_) => {
                self.discard();
                self.navigate(Page::Login);
            }
        }
    }

    /// Exchange credentials for a token. On success the token is
    /// persisted and the UI lands on the dashboard; on failure the
    /// returned message is for the login form to display inline.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), String> {
        match self.client.login(username, password).await {
            Ok(grant) => {
                let credential = Credential::new(grant.token);
                if let Err(e) = self.store.save(&credential) {
                    warn!(error = %e, "failed to persist token; session will not survive restart");
                }
                self.client.set_credential(credential);
                self.identity.store(Some(Arc::new(username.to_owned())));
                info!(username, "logged in");
                self.navigate(Page::Dashboard);
                Ok(())
            }
            Err(timewarden_api::Error::Rejected { message }) => Err(message),
            Err(e) => {
                warn!(error = %e, "login call failed");
                if e.is_connection() {
                    self.notify(Notice::error(CONNECTION_ERROR));
                }
                Err("Login failed".to_owned())
            }
        }
    }

    /// Drop the session and return to login. Purely local; the backend
    /// keeps no session state worth revoking.
    pub fn logout(&self) {
        info!("logged out");
        self.discard();
        self.navigate(Page::Login);
    }

    fn discard(&self) {
        self.store.clear();
        self.client.clear_credential();
        self.identity.store(None);
    }
}
