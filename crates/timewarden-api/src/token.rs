//! Bearer credential handling.
//!
//! The backend issues a three-part dot-separated signed token. The only
//! claim this client consumes is `exp` from the middle segment; the
//! signature is the backend's concern. Expiry decoding is fail-closed:
//! a credential we cannot parse is treated as expired, never as valid.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// An opaque bearer credential proving authenticated identity.
///
/// Wrapped in [`SecretString`] so the raw token never shows up in
/// `Debug` output or log lines.
#[derive(Clone)]
pub struct Credential {
    raw: SecretString,
}

#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: SecretString::from(raw.into()),
        }
    }

    /// The raw token, for the `Authorization: Bearer` header and for
    /// persistence. Handle with care.
    pub fn expose(&self) -> &str {
        self.raw.expose_secret()
    }

    /// Decode the expiry instant from the token's middle segment.
    ///
    /// Returns `None` for any malformed token: wrong segment count,
    /// invalid base64url, invalid JSON, or a missing/non-integer `exp`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let payload = self.expose().split('.').nth(1)?;
        let decoded = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: Claims = serde_json::from_slice(&decoded).ok()?;
        DateTime::from_timestamp(claims.exp, 0)
    }

    /// Whether the credential is expired at `now`.
    ///
    /// Fail-closed: an unparsable token is always expired. The clock is
    /// injected rather than read internally so expiry is testable.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_none_or(|exp| exp < now)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").finish_non_exhaustive()
    }
}
