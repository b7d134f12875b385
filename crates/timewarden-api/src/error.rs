use thiserror::Error;

/// Top-level error type for the `timewarden-api` crate.
///
/// Covers every failure mode of the HTTP surface. `timewarden-core`
/// maps these into forced logout, connection-error notifications, or
/// inline server messages -- callers of the client never branch on
/// HTTP status codes themselves.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP 401 from any endpoint. The response body is irrelevant;
    /// the session layer reacts by clearing the stored credential and
    /// returning to the login page.
    #[error("authorization rejected by the backend")]
    Unauthorized,

    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The backend answered with a well-formed envelope carrying
    /// `success: false`. The message is server-supplied and intended
    /// for display.
    #[error("request rejected: {message}")]
    Rejected { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error must trigger a forced logout.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if the operation never completed -- the backend
    /// was unreachable or produced an unreadable response. Distinct
    /// from [`Rejected`](Self::Rejected), which is a semantic answer.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::InvalidUrl(_) | Self::Deserialization { .. }
        )
    }

    /// The server-supplied rejection message, if there is one.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}
