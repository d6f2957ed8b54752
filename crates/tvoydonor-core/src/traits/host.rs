//! Host adapter trait.

use async_trait::async_trait;

use crate::credentials::IdentityPayload;
use crate::store::CredentialStore;
use crate::types::HostKind;
use crate::{RefreshToken, Result};

/// How the refresh credential reaches the refresh endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshCarrier {
    /// The transport cookie jar resends the server-set HTTP-only cookie.
    CookieJar,
    /// The credential is sent explicitly (no cookie jar on this host).
    Explicit(RefreshToken),
}

/// Capability surface of the runtime host, selected once at startup.
///
/// Callers never branch on host type: markers, refresh-credential
/// attachment and identity data all go through this trait.
#[async_trait]
pub trait HostAdapter: Send + Sync {
    /// Which host this adapter serves.
    fn kind(&self) -> HostKind;

    /// Session marker storage for this host.
    fn markers(&self) -> &CredentialStore;

    /// The credential to attach to the next refresh call.
    ///
    /// `Ok(None)` means no refresh credential exists on this host.
    async fn refresh_carrier(&self) -> Result<Option<RefreshCarrier>>;

    /// Persist a rotated refresh credential.
    async fn store_refresh_credential(&self, token: &RefreshToken) -> Result<()>;

    /// Drop the stored refresh credential.
    async fn forget_refresh_credential(&self) -> Result<()>;

    /// Host-injected signed identity data, if any.
    fn identity_payload(&self) -> Option<&IdentityPayload>;
}
