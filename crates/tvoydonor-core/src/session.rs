//! Session snapshot and lifecycle state.

use std::fmt;

use crate::tokens::AccessToken;
use crate::types::{UserProfile, UserType};

/// A signed-in session: access credential plus the account it belongs to.
#[derive(Clone, PartialEq)]
pub struct Session {
    pub access_token: AccessToken,
    pub user_type: UserType,
    pub profile: UserProfile,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_type", &self.user_type)
            .field("profile", &self.profile)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Lifecycle of a page's session.
///
/// `Unauthenticated -> Authenticating -> Authenticated -> Refreshing ->
/// Authenticated | Unauthenticated`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    /// Login or silent login in flight.
    Authenticating,
    Authenticated,
    /// A refresh call is outstanding.
    Refreshing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated => "authenticated",
            SessionState::Refreshing => "refreshing",
        };
        f.write_str(label)
    }
}

/// Result of checking the stored session against the backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Validation {
    /// The backend accepted the session; the profile was refreshed.
    Valid(UserProfile),
    /// The backend could not be reached; cached state is kept.
    Offline,
    /// No session, or the backend refused it. The session was cleared.
    Invalid,
}

impl Validation {
    /// Valid or offline: the user stays signed in.
    pub fn keeps_session(&self) -> bool {
        !matches!(self, Validation::Invalid)
    }
}
