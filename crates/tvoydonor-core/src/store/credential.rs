//! Session marker persistence.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, StorageError};
use crate::traits::KeyValueStore;
use crate::types::{UserProfile, UserType};
use crate::{AccessToken, RefreshToken, Result};

/// Key layout of a marker namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    /// Device storage: `user_type`, `donor_user`, `medcenter_user`, `auth_token`.
    Device,
    /// Embedded host cloud storage: the same keys prefixed with `tvoydonor_`,
    /// plus `tvoydonor_refresh_token`.
    Cloud,
}

impl Namespace {
    fn prefix(self) -> &'static str {
        match self {
            Namespace::Device => "",
            Namespace::Cloud => "tvoydonor_",
        }
    }
}

const USER_TYPE_KEY: &str = "user_type";
const LEGACY_TOKEN_KEY: &str = "auth_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Persists the non-secret session markers (user type, profile snapshot)
/// and, on an embedded host, the refresh credential.
///
/// Markers record *that* a session existed so UI state survives a reload;
/// they are never ground truth for authentication.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    namespace: Namespace,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.namespace.prefix(), name)
    }

    fn profile_key(&self, user_type: UserType) -> String {
        self.key(&format!("{}_user", user_type.as_str()))
    }

    /// Write the user type and the profile snapshot for it.
    ///
    /// A `legacy_token` is also written to the flat `auth_token` key that
    /// older page scripts read directly.
    pub async fn save_user_markers(
        &self,
        user_type: UserType,
        profile: &UserProfile,
        legacy_token: Option<&AccessToken>,
    ) -> Result<()> {
        let profile_json = serde_json::to_string(profile).map_err(|e| StorageError::Corrupt {
            message: e.to_string(),
        })?;

        self.store
            .set(&self.key(USER_TYPE_KEY), user_type.as_str())
            .await?;
        self.store
            .set(&self.profile_key(user_type), &profile_json)
            .await?;

        if let Some(token) = legacy_token {
            self.store
                .set(&self.key(LEGACY_TOKEN_KEY), token.as_str())
                .await?;
        }

        debug!(%user_type, namespace = ?self.namespace, "Saved session markers");
        Ok(())
    }

    /// Stored user type. Unknown values read as `None`.
    pub async fn read_user_type(&self) -> Result<Option<UserType>> {
        let Some(raw) = self.store.get(&self.key(USER_TYPE_KEY)).await? else {
            return Ok(None);
        };
        match raw.parse::<UserType>() {
            Ok(user_type) => Ok(Some(user_type)),
            Err(e) => {
                warn!(error = %e, "Ignoring stored user type");
                Ok(None)
            }
        }
    }

    /// Stored profile for `user_type`. Unparseable JSON reads as `None`.
    pub async fn read_profile(&self, user_type: UserType) -> Result<Option<UserProfile>> {
        let Some(raw) = self.store.get(&self.profile_key(user_type)).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Ok(Some(UserProfile::new(value))),
            Err(e) => {
                warn!(error = %e, %user_type, "Ignoring unparseable stored profile");
                Ok(None)
            }
        }
    }

    /// Replace the profile of the stored user type.
    ///
    /// Returns `Ok(false)` without writing when no user type is stored.
    pub async fn update_profile(&self, profile: &UserProfile) -> Result<bool> {
        let Some(user_type) = self.read_user_type().await? else {
            warn!("Cannot update profile: no stored user type");
            return Ok(false);
        };
        let profile_json = serde_json::to_string(profile).map_err(|e| StorageError::Corrupt {
            message: e.to_string(),
        })?;
        self.store
            .set(&self.profile_key(user_type), &profile_json)
            .await?;
        Ok(true)
    }

    /// True if a user type marker exists.
    pub async fn has_session(&self) -> Result<bool> {
        Ok(self.read_user_type().await?.is_some())
    }

    /// Access credential left in `auth_token` by the legacy mirror.
    pub async fn read_legacy_token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .store
            .get(&self.key(LEGACY_TOKEN_KEY))
            .await?
            .filter(|t| !t.is_empty())
            .map(AccessToken::new))
    }

    pub async fn save_refresh_token(&self, token: &RefreshToken) -> Result<()> {
        self.store
            .set(&self.key(REFRESH_TOKEN_KEY), token.as_str())
            .await
    }

    pub async fn read_refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self
            .store
            .get(&self.key(REFRESH_TOKEN_KEY))
            .await?
            .filter(|t| !t.is_empty())
            .map(RefreshToken::new))
    }

    pub async fn remove_refresh_token(&self) -> Result<()> {
        self.store.remove(&self.key(REFRESH_TOKEN_KEY)).await
    }

    /// Remove every marker, the legacy token and the refresh credential.
    ///
    /// Every key is attempted; the first failure is returned.
    pub async fn clear(&self) -> Result<()> {
        let mut keys = vec![
            self.key(USER_TYPE_KEY),
            self.key(LEGACY_TOKEN_KEY),
            self.key(REFRESH_TOKEN_KEY),
        ];
        keys.extend(UserType::all().into_iter().map(|t| self.profile_key(t)));

        let mut first_error: Option<Error> = None;
        for key in keys {
            if let Err(e) = self.store.remove(&key).await {
                warn!(key = %key, error = %e, "Failed to remove session marker");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                debug!(namespace = ?self.namespace, "Cleared session markers");
                Ok(())
            }
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn device() -> (Arc<MemoryStore>, CredentialStore) {
        let memory = Arc::new(MemoryStore::new());
        let store = CredentialStore::new(memory.clone(), Namespace::Device);
        (memory, store)
    }

    #[tokio::test]
    async fn saves_and_reads_markers() {
        let (memory, store) = device();
        let profile = UserProfile::new(json!({"id": 1, "full_name": "Anna"}));

        store
            .save_user_markers(UserType::Donor, &profile, None)
            .await
            .unwrap();

        assert_eq!(memory.peek("user_type").as_deref(), Some("donor"));
        assert_eq!(
            store.read_user_type().await.unwrap(),
            Some(UserType::Donor)
        );
        assert_eq!(
            store.read_profile(UserType::Donor).await.unwrap(),
            Some(profile)
        );
        assert!(store.has_session().await.unwrap());
    }

    #[tokio::test]
    async fn legacy_token_written_only_when_supplied() {
        let (memory, store) = device();
        let token = AccessToken::new("a.b.c");

        store
            .save_user_markers(UserType::Donor, &UserProfile::empty(), None)
            .await
            .unwrap();
        assert_eq!(memory.peek("auth_token"), None);
        assert_eq!(store.read_legacy_token().await.unwrap(), None);

        store
            .save_user_markers(UserType::Donor, &UserProfile::empty(), Some(&token))
            .await
            .unwrap();
        assert_eq!(memory.peek("auth_token").as_deref(), Some("a.b.c"));
        assert_eq!(store.read_legacy_token().await.unwrap(), Some(token));
    }

    #[tokio::test]
    async fn corrupt_profile_reads_as_none() {
        let (memory, store) = device();
        memory.set("user_type", "donor").await.unwrap();
        memory.set("donor_user", "{not json").await.unwrap();

        assert_eq!(store.read_profile(UserType::Donor).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_user_type_reads_as_none() {
        let (memory, store) = device();
        memory.set("user_type", "admin").await.unwrap();

        assert_eq!(store.read_user_type().await.unwrap(), None);
        assert!(!store.has_session().await.unwrap());
    }

    #[tokio::test]
    async fn update_profile_requires_user_type() {
        let (memory, store) = device();
        let profile = UserProfile::new(json!({"name": "Center"}));
        assert!(!store.update_profile(&profile).await.unwrap());

        memory.set("user_type", "medcenter").await.unwrap();
        assert!(store.update_profile(&profile).await.unwrap());
        assert_eq!(
            store.read_profile(UserType::MedicalCenter).await.unwrap(),
            Some(profile)
        );
    }

    #[tokio::test]
    async fn cloud_namespace_prefixes_keys() {
        let memory = Arc::new(MemoryStore::new());
        let store = CredentialStore::new(memory.clone(), Namespace::Cloud);

        store
            .save_user_markers(UserType::MedicalCenter, &UserProfile::empty(), None)
            .await
            .unwrap();
        store
            .save_refresh_token(&RefreshToken::new("r1"))
            .await
            .unwrap();

        assert_eq!(
            memory.peek("tvoydonor_user_type").as_deref(),
            Some("medcenter")
        );
        assert!(memory.peek("tvoydonor_medcenter_user").is_some());
        assert_eq!(
            memory.peek("tvoydonor_refresh_token").as_deref(),
            Some("r1")
        );
        assert_eq!(memory.peek("user_type"), None);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let (memory, store) = device();
        memory.set("user_type", "donor").await.unwrap();
        memory.set("donor_user", "{}").await.unwrap();
        memory.set("medcenter_user", "{}").await.unwrap();
        memory.set("auth_token", "stale").await.unwrap();
        memory.set("refresh_token", "r").await.unwrap();
        memory.set("unrelated", "keep").await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(memory.len(), 1);
        assert_eq!(memory.peek("unrelated").as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn clear_on_unavailable_store_reports_error() {
        let store = CredentialStore::new(Arc::new(MemoryStore::unavailable()), Namespace::Device);
        assert!(store.clear().await.is_err());
    }
}
