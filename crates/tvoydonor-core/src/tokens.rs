//! Token types for session authentication.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::codec;

/// A short-lived access credential attached to API calls.
///
/// Access tokens are JWTs issued by the backend. They are held in memory
/// only; persistent storage records that a session existed, never the
/// secret itself.
///
/// # Security
///
/// - Never logged or displayed in Debug output
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded `exp` claim, if the token is well formed.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        codec::decode_expiry(&self.0).ok()
    }

    /// True if the token is malformed or expires within `margin`.
    pub fn is_expired(&self, margin: Duration) -> bool {
        codec::is_expired(&self.0, margin)
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A long-lived refresh credential.
///
/// On a standard host it never leaves the transport cookie jar. On an
/// embedded host it is stored in the host's cloud key-value store and
/// sent explicitly. Every successful refresh may rotate it.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}
