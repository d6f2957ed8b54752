//! Error types for the tvoydonor session layer.
//!
//! One unified error type with explicit variants for transport,
//! authentication, protocol, storage and input validation failures.

use std::fmt;
use thiserror::Error;

/// The unified error type for session operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (malformed or rejected credentials).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the backend.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Persistence layer failures (device or cloud storage).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (bad URL, unknown user type).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// True for failures that should surface as a connection problem
    /// rather than forcing the user to sign in again.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Protocol(err) => err.is_server_error(),
            Error::Auth(AuthError::RefreshUnavailable) => true,
            _ => false,
        }
    }

    /// True if the backend explicitly refused the presented credential.
    pub fn is_rejection(&self) -> bool {
        match self {
            Error::Protocol(err) => err.is_rejection(),
            Error::Auth(AuthError::RefreshRejected | AuthError::LoginRequired) => true,
            _ => false,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("malformed response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential is not a three-segment token with a numeric `exp` claim.
    #[error("malformed credential: {reason}")]
    MalformedCredential { reason: String },

    /// The backend invalidated the refresh credential.
    #[error("refresh credential rejected")]
    RefreshRejected,

    /// A refresh was needed but could not complete (network or server trouble).
    #[error("session refresh unavailable")]
    RefreshUnavailable,

    /// The session is gone; the user has to sign in again.
    #[error("login required")]
    LoginRequired,

    /// Login refused by the backend.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The host did not provide identity data for a silent login.
    #[error("no host identity data available")]
    NoIdentity,
}

/// Non-success response from the backend.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Human readable `error` field, if present.
    pub error: Option<String>,
    /// Machine readable `code` field (e.g. `TOKEN_EXPIRED`), if present.
    pub code: Option<String>,
    /// `message` field, if present.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref error) = self.error {
            write!(f, ": {}", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, " ({})", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(
        status: u16,
        error: Option<String>,
        code: Option<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            status,
            error,
            code,
            message,
        }
    }

    /// Check if this is an authentication error (401-equivalent).
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.code.as_deref() == Some("TOKEN_EXPIRED")
    }

    /// 401 or 403: the presented credential was refused.
    pub fn is_rejection(&self) -> bool {
        self.is_auth_error() || self.status == 403
    }

    /// 5xx responses.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage backend is absent or refuses access.
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },

    /// Reading or writing failed.
    #[error("storage I/O failed: {message}")]
    Io { message: String },

    /// Stored data could not be (de)serialized.
    #[error("stored data is corrupt: {message}")]
    Corrupt { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Unknown user type string.
    #[error("unknown user type '{value}'")]
    UserType { value: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
