//! Backend endpoint paths and request/response types.

use serde::{Deserialize, Serialize};
use tvoydonor_core::error::TransportError;
use tvoydonor_core::{AccessToken, RefreshToken, Result, Session, UserProfile, UserType};

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const DONOR_LOGIN: &str = "/donor/login";

pub const MEDCENTER_LOGIN: &str = "/medcenter/login";

/// Cookie-carried refresh (standard host).
pub const REFRESH: &str = "/auth/refresh";

/// Explicit-credential refresh (embedded host).
pub const REFRESH_EMBEDDED: &str = "/auth/refresh-telegram";

pub const LOGOUT: &str = "/auth/logout";

pub const LOGOUT_ALL: &str = "/auth/logout-all";

/// Signed host identity payload exchange.
pub const IDENTITY_EXCHANGE: &str = "/auth/telegram";

/// Header duplicating the explicit refresh credential.
pub const REFRESH_TOKEN_HEADER: &str = "X-Refresh-Token";

/// Name of the HTTP-only refresh cookie.
pub const REFRESH_COOKIE: &str = "refresh_token";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of the explicit refresh and revoke calls.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Body of the identity exchange.
#[derive(Debug, Serialize)]
pub struct IdentityExchangeRequest<'a> {
    pub init_data: &'a str,
}

/// Any response that issues a session: login, refresh, identity exchange.
///
/// Login endpoints spell the credential `token` and medical center logins
/// return the account under `medical_center`; both spellings are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub medical_center: Option<serde_json::Value>,
}

impl SessionResponse {
    /// Build a session, using `fallback` when the response names no user type.
    ///
    /// Also returns the rotated refresh credential, if one was issued.
    pub fn into_session(self, fallback: Option<UserType>) -> Result<(Session, Option<RefreshToken>)> {
        let access_token = self
            .access_token
            .or(self.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TransportError::Decode {
                message: "response carried no access token".to_string(),
            })?;

        let user_type = match self.user_type.as_deref() {
            Some(raw) => raw.parse::<UserType>()?,
            None => fallback.ok_or_else(|| TransportError::Decode {
                message: "response carried no user type".to_string(),
            })?,
        };

        let profile = self
            .user
            .or(self.medical_center)
            .map(UserProfile::new)
            .unwrap_or_default();

        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .map(RefreshToken::new);

        Ok((
            Session {
                access_token: AccessToken::new(access_token),
                user_type,
                profile,
            },
            refresh_token,
        ))
    }
}

/// Backend error body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
