//! tvoydonor-core - session types, token codec and marker storage for the
//! Tvoy Donor client.
//!
//! The HTTP session manager lives in `tvoydonor-http`; this crate holds
//! everything that does not touch the network.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tvoydonor_core::store::{CredentialStore, MemoryStore, Namespace};
//! use tvoydonor_core::{codec, AccessToken};
//!
//! let markers = CredentialStore::new(Arc::new(MemoryStore::new()), Namespace::Device);
//! assert_eq!(markers.namespace(), Namespace::Device);
//!
//! let token = AccessToken::new("not-a-jwt");
//! assert!(token.is_expired(codec::default_expiry_margin()));
//! ```

pub mod codec;
pub mod credentials;
pub mod error;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{DonorCredentials, IdentityPayload, MedicalCenterCredentials};
pub use error::Error;
pub use session::{Session, SessionState, Validation};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{HostAdapter, KeyValueStore, Navigator, RefreshCarrier};
pub use types::{ApiUrl, HostKind, UserProfile, UserType, detect_host};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
