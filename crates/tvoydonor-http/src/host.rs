//! Host adapters: standard browser-like host and embedded mini-app host.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use tvoydonor_core::store::{CredentialStore, Namespace};
use tvoydonor_core::{
    HostAdapter, HostKind, IdentityPayload, KeyValueStore, RefreshCarrier, RefreshToken, Result,
    detect_host,
};

/// Standard host: markers in device storage, refresh credential in the
/// transport cookie jar.
#[derive(Debug)]
pub struct BrowserHost {
    markers: CredentialStore,
}

impl BrowserHost {
    pub fn new(device: Arc<dyn KeyValueStore>) -> Self {
        Self {
            markers: CredentialStore::new(device, Namespace::Device),
        }
    }
}

#[async_trait]
impl HostAdapter for BrowserHost {
    fn kind(&self) -> HostKind {
        HostKind::StandardBrowser
    }

    fn markers(&self) -> &CredentialStore {
        &self.markers
    }

    async fn refresh_carrier(&self) -> Result<Option<RefreshCarrier>> {
        Ok(Some(RefreshCarrier::CookieJar))
    }

    async fn store_refresh_credential(&self, _token: &RefreshToken) -> Result<()> {
        debug!("Refresh credential stays in the cookie jar");
        Ok(())
    }

    async fn forget_refresh_credential(&self) -> Result<()> {
        Ok(())
    }

    fn identity_payload(&self) -> Option<&IdentityPayload> {
        None
    }
}

/// Embedded host: markers and the refresh credential in the host's cloud
/// store, plus the signed identity payload the host injected.
#[derive(Debug)]
pub struct EmbeddedHost {
    markers: CredentialStore,
    identity: IdentityPayload,
}

impl EmbeddedHost {
    pub fn new(cloud: Arc<dyn KeyValueStore>, identity: IdentityPayload) -> Self {
        Self {
            markers: CredentialStore::new(cloud, Namespace::Cloud),
            identity,
        }
    }
}

#[async_trait]
impl HostAdapter for EmbeddedHost {
    fn kind(&self) -> HostKind {
        HostKind::EmbeddedHost
    }

    fn markers(&self) -> &CredentialStore {
        &self.markers
    }

    async fn refresh_carrier(&self) -> Result<Option<RefreshCarrier>> {
        Ok(self
            .markers
            .read_refresh_token()
            .await?
            .map(RefreshCarrier::Explicit))
    }

    async fn store_refresh_credential(&self, token: &RefreshToken) -> Result<()> {
        self.markers.save_refresh_token(token).await
    }

    async fn forget_refresh_credential(&self) -> Result<()> {
        self.markers.remove_refresh_token().await
    }

    fn identity_payload(&self) -> Option<&IdentityPayload> {
        Some(&self.identity)
    }
}

/// Pick the adapter for this runtime once, at startup.
///
/// Non-blank `init_data` selects the embedded host. Without a cloud store
/// the embedded host falls back to device storage, keeping its key prefix.
pub fn select_host(
    init_data: Option<&str>,
    device: Arc<dyn KeyValueStore>,
    cloud: Option<Arc<dyn KeyValueStore>>,
) -> Arc<dyn HostAdapter> {
    match (detect_host(init_data), init_data) {
        (HostKind::EmbeddedHost, Some(init_data)) => {
            let store = cloud.unwrap_or_else(|| {
                warn!("Host has no cloud storage; using device storage");
                device
            });
            info!("Embedded host detected");
            Arc::new(EmbeddedHost::new(store, IdentityPayload::new(init_data)))
        }
        _ => {
            debug!("Standard host");
            Arc::new(BrowserHost::new(device))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvoydonor_core::store::MemoryStore;

    #[test]
    fn select_host_by_init_data() {
        let device: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let host = select_host(None, device.clone(), None);
        assert_eq!(host.kind(), HostKind::StandardBrowser);
        assert!(host.identity_payload().is_none());

        let host = select_host(Some("   "), device.clone(), None);
        assert_eq!(host.kind(), HostKind::StandardBrowser);

        let host = select_host(Some("query_id=1&hash=ab"), device, None);
        assert_eq!(host.kind(), HostKind::EmbeddedHost);
        assert_eq!(host.markers().namespace(), Namespace::Cloud);
        assert_eq!(
            host.identity_payload().map(IdentityPayload::as_str),
            Some("query_id=1&hash=ab")
        );
    }

    #[tokio::test]
    async fn browser_host_uses_cookie_jar() {
        let host = BrowserHost::new(Arc::new(MemoryStore::new()));
        host.store_refresh_credential(&RefreshToken::new("ignored"))
            .await
            .unwrap();
        assert_eq!(
            host.refresh_carrier().await.unwrap(),
            Some(RefreshCarrier::CookieJar)
        );
    }

    #[tokio::test]
    async fn embedded_host_keeps_refresh_credential_in_cloud() {
        let cloud = Arc::new(MemoryStore::new());
        let host = EmbeddedHost::new(cloud.clone(), IdentityPayload::new("init"));

        assert_eq!(host.refresh_carrier().await.unwrap(), None);

        host.store_refresh_credential(&RefreshToken::new("r1"))
            .await
            .unwrap();
        assert_eq!(
            cloud.peek("tvoydonor_refresh_token").as_deref(),
            Some("r1")
        );
        assert_eq!(
            host.refresh_carrier().await.unwrap(),
            Some(RefreshCarrier::Explicit(RefreshToken::new("r1")))
        );

        host.forget_refresh_credential().await.unwrap();
        assert_eq!(host.refresh_carrier().await.unwrap(), None);
    }

    #[tokio::test]
    async fn embedded_host_without_cloud_store_fails_softly() {
        let host = EmbeddedHost::new(Arc::new(MemoryStore::unavailable()), IdentityPayload::new("x"));
        assert!(host.refresh_carrier().await.is_err());
    }
}
