//! Expiry decoding for JWT access credentials.
//!
//! The signature is never verified here: the backend is the authority on
//! validity. The client only needs `exp` to decide when to refresh ahead
//! of a rejection. Every decode failure is treated as "expired".

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};

use crate::error::AuthError;

/// Credentials closer than this many seconds to their `exp` are treated as expired.
pub const DEFAULT_EXPIRY_MARGIN_SECS: i64 = 30;

/// [`DEFAULT_EXPIRY_MARGIN_SECS`] as a [`Duration`].
pub fn default_expiry_margin() -> Duration {
    Duration::seconds(DEFAULT_EXPIRY_MARGIN_SECS)
}

fn malformed(reason: impl Into<String>) -> AuthError {
    AuthError::MalformedCredential {
        reason: reason.into(),
    }
}

/// Extract the `exp` claim of a `header.payload.signature` token.
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = segments[1];
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| malformed(format!("payload is not base64url: {}", e)))?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| malformed(format!("payload is not JSON: {}", e)))?;

    let exp = claims
        .get("exp")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| malformed("missing numeric exp claim"))?;

    DateTime::<Utc>::from_timestamp(exp.trunc() as i64, 0)
        .ok_or_else(|| malformed("exp claim out of range"))
}

/// True if `token` cannot be decoded or `now + margin >= exp`.
pub fn is_expired(token: &str, margin: Duration) -> bool {
    is_expired_at(token, margin, Utc::now())
}

/// Clock-injected form of [`is_expired`].
pub fn is_expired_at(token: &str, margin: Duration, now: DateTime<Utc>) -> bool {
    match decode_expiry(token) {
        Ok(exp) => now + margin >= exp,
        Err(_) => true,
    }
}
