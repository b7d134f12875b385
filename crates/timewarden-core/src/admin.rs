//! Admin view model: the managed-user table and its mutations.

use std::time::Duration;

use timewarden_api::UserSummary;

use crate::event::Notice;
use crate::session::{CallError, Session};

pub const LOAD_FAILED: &str = "Failed to load admin data";

/// How long a success toast is left on screen before the table reloads.
pub const RELOAD_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub enum AdminState {
    Loading,
    Failed,
    Ready(Vec<UserSummary>),
}

pub async fn fetch_admin(session: &Session) -> AdminState {
    match session.settle(session.api().admin_users().await) {
        Ok(users) => AdminState::Ready(users),
        Err(_) => AdminState::Failed,
    }
}

/// Register a new user. Returns whether a delayed reload should be
/// scheduled; the outcome itself is reported through a toast.
pub async fn add_user(session: &Session, username: &str, system_ip: &str) -> bool {
    match session.settle(session.api().add_user(username, system_ip).await) {
        Ok(ack) => {
            session.notify(Notice::success(ack.message_or("User added")));
            true
        }
        Err(CallError::Rejected(message)) => {
            session.notify(Notice::error(message));
            false
        }
        // settle already toasted or redirected.
        Err(_) => false,
    }
}

/// Re-run the backend's reachability check for one user.
pub async fn validate_user(session: &Session, user_id: i64) -> bool {
    match session.settle(session.api().validate_user(user_id).await) {
        Ok(ack) => {
            session.notify(Notice::success(ack.message_or("User validated")));
            true
        }
        Err(CallError::Rejected(message)) => {
            session.notify(Notice::error(message));
            false
        }
        Err(_) => false,
    }
}

/// Remove a user. Confirmation is the UI's responsibility; by the time
/// this runs the deletion is decided.
pub async fn delete_user(session: &Session, user_id: i64) -> bool {
    match session.settle(session.api().delete_user(user_id).await) {
        Ok(ack) => {
            session.notify(Notice::success(ack.message_or("User deleted")));
            true
        }
        Err(CallError::Rejected(message)) => {
            session.notify(Notice::error(message));
            false
        }
        Err(_) => false,
    }
}
