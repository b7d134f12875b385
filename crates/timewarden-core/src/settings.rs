//! Settings page: password change.

use thiserror::Error;

use crate::session::{CallError, Session};

pub const CHANGE_SUCCESS: &str = "Password changed successfully";
const CHANGE_FAILED: &str = "Failed to change password";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Caught locally; no request is sent.
    #[error("New passwords do not match")]
    Mismatch,
    /// Backend refused the change (wrong current password, policy).
    #[error("{0}")]
    Rejected(String),
}

/// Change the admin password. The mismatch check runs before any
/// network traffic so a typo never reaches the backend.
pub async fn change_password(
    session: &Session,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<&'static str, PasswordError> {
    if new != confirm {
        return Err(PasswordError::Mismatch);
    }

    match session.settle(session.api().change_password(current, new, confirm).await) {
        Ok(_) => Ok(CHANGE_SUCCESS),
        Err(CallError::Rejected(message)) => Err(PasswordError::Rejected(message)),
        Err(_) => Err(PasswordError::Rejected(CHANGE_FAILED.to_owned())),
    }
}
