//! Session management with single-flight token refresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Duration;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};
use tvoydonor_core::codec::default_expiry_margin;
use tvoydonor_core::error::AuthError;
use tvoydonor_core::{
    AccessToken, DonorCredentials, HostAdapter, HostKind, MedicalCenterCredentials, Navigator,
    RefreshCarrier, RefreshToken, Result, Session, SessionState, UserProfile, UserType, Validation,
};

use crate::client::{ApiClient, RevokeScope};
use crate::request::ApiRequest;

/// Session behaviour settings.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// A credential expiring within this window counts as expired.
    pub expiry_margin: Duration,
    /// Also persist the access credential to the flat `auth_token` key and
    /// fall back to it in [`SessionManager::get_token_sync`].
    pub legacy_token_mirror: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry_margin: default_expiry_margin(),
            legacy_token_mirror: false,
        }
    }
}

/// Outcome every waiter of one refresh observes.
#[derive(Clone, Debug)]
enum RefreshOutcome {
    Refreshed(AccessToken),
    /// The backend refused the refresh credential; the session was cleared.
    Rejected,
    /// Network, server or storage failure; the session was left alone.
    Failed,
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Result of one authenticated send with the post-401 retry.
enum Attempt {
    Response(reqwest::Response),
    Rejected,
    Unavailable,
}

#[derive(Default)]
struct SessionSlot {
    access_token: Option<AccessToken>,
    user_type: Option<UserType>,
    profile: Option<UserProfile>,
    /// Synchronous snapshot of the mirrored `auth_token`.
    legacy_token: Option<AccessToken>,
    authenticating: bool,
}

/// The client's session: current access credential, refresh, and
/// authenticated calls.
///
/// At most one session exists per manager. Cloning shares it, including
/// any refresh in flight.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tvoydonor_core::store::MemoryStore;
/// use tvoydonor_core::{ApiUrl, DonorCredentials, Navigator};
/// use tvoydonor_http::{ApiClient, ApiRequest, BrowserHost, SessionManager};
///
/// struct Page;
/// impl Navigator for Page {
///     fn redirect_to_login(&self) {}
/// }
///
/// # async fn example() -> Result<(), tvoydonor_core::Error> {
/// let client = ApiClient::new(ApiUrl::new("https://tvoydonor.by/api")?)?;
/// let host = Arc::new(BrowserHost::new(Arc::new(MemoryStore::new())));
/// let session = SessionManager::new(client, host, Arc::new(Page));
///
/// session
///     .login_donor(&DonorCredentials::new("Anna Ivanova", 1990, 3, "secret"))
///     .await?;
/// let response = session.auth_fetch(&ApiRequest::get("/donor/profile")).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    client: ApiClient,
    host: Arc<dyn HostAdapter>,
    navigator: Arc<dyn Navigator>,
    config: SessionConfig,
    slot: RwLock<SessionSlot>,
    refresh: Mutex<Option<SharedRefresh>>,
    redirected: AtomicBool,
}

/// Resets the authenticating flag when a login attempt ends.
struct AuthenticatingGuard<'a>(&'a Inner);

impl Drop for AuthenticatingGuard<'_> {
    fn drop(&mut self) {
        self.0.write_slot().authenticating = false;
    }
}

impl SessionManager {
    pub fn new(client: ApiClient, host: Arc<dyn HostAdapter>, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_config(client, host, navigator, SessionConfig::default())
    }

    pub fn with_config(
        client: ApiClient,
        host: Arc<dyn HostAdapter>,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                host,
                navigator,
                config,
                slot: RwLock::new(SessionSlot::default()),
                refresh: Mutex::new(None),
                redirected: AtomicBool::new(false),
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn host_kind(&self) -> HostKind {
        self.inner.host.kind()
    }

    // ========================================================================
    // Session State
    // ========================================================================

    /// Install a session: memory first, then the persistent markers.
    ///
    /// Storage failures are logged and do not undo the in-memory session.
    pub async fn save(&self, access_token: AccessToken, user_type: UserType, profile: UserProfile) {
        self.inner.save(access_token, user_type, profile).await;
    }

    /// Wipe the in-memory session and every persistent marker. Idempotent.
    pub async fn clear(&self) {
        self.inner.clear().await;
    }

    /// Load the persisted user type and profile into memory.
    ///
    /// No credential is restored; the first [`SessionManager::get_token`]
    /// refreshes. Returns true if markers of a previous session were found.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> bool {
        let markers = self.inner.host.markers();

        let user_type = match markers.read_user_type().await {
            Ok(user_type) => user_type,
            Err(e) => {
                warn!(error = %e, "Cannot read session markers");
                None
            }
        };
        let Some(user_type) = user_type else {
            debug!("No stored session");
            return false;
        };

        let profile = markers.read_profile(user_type).await.unwrap_or_else(|e| {
            warn!(error = %e, "Cannot read stored profile");
            None
        });
        let legacy_token = if self.inner.config.legacy_token_mirror {
            markers.read_legacy_token().await.unwrap_or_else(|e| {
                warn!(error = %e, "Cannot read mirrored token");
                None
            })
        } else {
            None
        };

        let mut slot = self.inner.write_slot();
        slot.user_type = Some(user_type);
        slot.profile = profile;
        slot.legacy_token = legacy_token;
        info!(%user_type, "Restored session markers");
        true
    }

    /// Replace the profile in memory and in storage.
    pub async fn update_profile(&self, profile: UserProfile) {
        self.inner.write_slot().profile = Some(profile.clone());
        if let Err(e) = self.inner.host.markers().update_profile(&profile).await {
            warn!(error = %e, "Failed to persist profile");
        }
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.inner.read_slot().user_type
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.inner.read_slot().profile.clone()
    }

    /// The current session, if a credential is held.
    pub fn session(&self) -> Option<Session> {
        let slot = self.inner.read_slot();
        Some(Session {
            access_token: slot.access_token.clone()?,
            user_type: slot.user_type?,
            profile: slot.profile.clone().unwrap_or_default(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read_slot().access_token.is_some()
    }

    pub fn state(&self) -> SessionState {
        let refreshing = self.inner.lock_refresh().is_some();
        let slot = self.inner.read_slot();
        if refreshing {
            SessionState::Refreshing
        } else if slot.authenticating {
            SessionState::Authenticating
        } else if slot.access_token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// A valid access credential, refreshing first if needed.
    ///
    /// Never reads a credential from storage.
    pub async fn get_token(&self) -> Option<AccessToken> {
        if let Some(token) = self.inner.valid_token() {
            return Some(token);
        }
        match self.inner.refresh_if_expired().await {
            RefreshOutcome::Refreshed(token) => Some(token),
            RefreshOutcome::Rejected | RefreshOutcome::Failed => None,
        }
    }

    /// The in-memory credential, else the mirrored legacy value. May be
    /// stale; never suspends.
    pub fn get_token_sync(&self) -> Option<AccessToken> {
        let slot = self.inner.read_slot();
        slot.access_token
            .clone()
            .or_else(|| slot.legacy_token.clone())
    }

    /// Refresh the session. Concurrent callers share one network call.
    ///
    /// Returns true if a new credential was obtained. A rejected refresh
    /// clears the session; any other failure leaves it untouched.
    pub async fn refresh(&self) -> bool {
        matches!(
            self.inner.refresh_shared().await,
            RefreshOutcome::Refreshed(_)
        )
    }

    // ========================================================================
    // Authenticated Calls
    // ========================================================================

    /// Send a request with the current credential, refreshing and retrying
    /// once if the backend answers 401.
    ///
    /// At most one refresh runs per call: an expired credential is
    /// refreshed before sending, and then a 401 is returned as is. The
    /// request is never sent without a credential. A refused refresh
    /// clears the session, navigates to login and yields
    /// [`AuthError::LoginRequired`]; a failed one yields
    /// [`AuthError::RefreshUnavailable`] and keeps the session.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn auth_fetch(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        match self.send_with_retry(request).await? {
            Attempt::Response(response) => Ok(response),
            Attempt::Rejected => {
                self.inner.redirect_once();
                Err(AuthError::LoginRequired.into())
            }
            Attempt::Unavailable => Err(AuthError::RefreshUnavailable.into()),
        }
    }

    async fn send_with_retry(&self, request: &ApiRequest) -> Result<Attempt> {
        let (token, refreshed) = match self.inner.valid_token() {
            Some(token) => (token, false),
            None => match self.inner.refresh_if_expired().await {
                RefreshOutcome::Refreshed(token) => (token, true),
                RefreshOutcome::Rejected => return Ok(Attempt::Rejected),
                RefreshOutcome::Failed => return Ok(Attempt::Unavailable),
            },
        };

        let response = self.inner.client.send(request, Some(&token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED || refreshed {
            return Ok(Attempt::Response(response));
        }

        info!("Request unauthorized, refreshing");
        match self.inner.refresh_shared().await {
            RefreshOutcome::Refreshed(token) => {
                let retried = self.inner.client.send(request, Some(&token)).await?;
                Ok(Attempt::Response(retried))
            }
            RefreshOutcome::Rejected => Ok(Attempt::Rejected),
            RefreshOutcome::Failed => Ok(Attempt::Unavailable),
        }
    }

    /// Check the session against the profile endpoint.
    ///
    /// Never navigates. A valid session gets its profile refreshed.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> Validation {
        let Some(user_type) = self.user_type() else {
            debug!("Nothing to validate");
            self.inner.clear().await;
            return Validation::Invalid;
        };

        let request = ApiRequest::get(user_type.profile_path());
        let response = match self.send_with_retry(&request).await {
            Ok(Attempt::Response(response)) => response,
            Ok(Attempt::Rejected) => return Validation::Invalid,
            Ok(Attempt::Unavailable) => return Validation::Offline,
            Err(e) => {
                warn!(error = %e, "Validation request failed");
                return Validation::Offline;
            }
        };

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            info!(%status, "Session refused");
            self.inner.clear().await;
            return Validation::Invalid;
        }
        if !status.is_success() {
            warn!(%status, "Validation inconclusive");
            return Validation::Offline;
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => {
                let profile = UserProfile::new(body);
                self.update_profile(profile.clone()).await;
                Validation::Valid(profile)
            }
            Err(e) => {
                warn!(error = %e, "Unreadable profile response");
                Validation::Offline
            }
        }
    }

    // ========================================================================
    // Login and Logout
    // ========================================================================

    #[instrument(skip(self, credentials), fields(full_name = %credentials.full_name()))]
    pub async fn login_donor(&self, credentials: &DonorCredentials) -> Result<Session> {
        let _guard = self.inner.begin_authenticating();
        info!("Logging in donor");
        let response = self.inner.client.login_donor(credentials).await?;
        let (session, refresh) = response.into_session(Some(UserType::Donor))?;
        self.inner.install(session.clone(), refresh).await;
        Ok(session)
    }

    #[instrument(skip(self, credentials), fields(medical_center_id = credentials.medical_center_id()))]
    pub async fn login_medical_center(
        &self,
        credentials: &MedicalCenterCredentials,
    ) -> Result<Session> {
        let _guard = self.inner.begin_authenticating();
        info!("Logging in medical center");
        let response = self.inner.client.login_medical_center(credentials).await?;
        let (session, refresh) = response.into_session(Some(UserType::MedicalCenter))?;
        self.inner.install(session.clone(), refresh).await;
        Ok(session)
    }

    /// Establish a session without user interaction.
    ///
    /// Tries the stored refresh credential first, then exchanges the host
    /// identity payload. Every failure degrades to `None`.
    #[instrument(skip(self), fields(host = %self.inner.host.kind()))]
    pub async fn silent_login(&self) -> Option<Session> {
        let _guard = self.inner.begin_authenticating();
        let host = &self.inner.host;

        match host.refresh_carrier().await {
            Ok(Some(_)) => match self.inner.refresh_shared().await {
                RefreshOutcome::Refreshed(_) => {
                    if let Some(session) = self.session() {
                        info!("Silent login via stored refresh credential");
                        return Some(session);
                    }
                }
                RefreshOutcome::Rejected => {
                    if let Err(e) = host.forget_refresh_credential().await {
                        warn!(error = %e, "Failed to drop dead refresh credential");
                    }
                }
                RefreshOutcome::Failed => debug!("Refresh unavailable, trying identity payload"),
            },
            Ok(None) => debug!("No stored refresh credential"),
            Err(e) => warn!(error = %e, "Refresh credential unreadable"),
        }

        let Some(payload) = host.identity_payload() else {
            debug!("No identity payload");
            return None;
        };

        let response = match self.inner.client.exchange_identity(payload).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Identity exchange failed");
                return None;
            }
        };
        match response.into_session(None) {
            Ok((session, refresh)) => {
                self.inner.install(session.clone(), refresh).await;
                info!(user_type = %session.user_type, "Silent login via identity payload");
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "Identity exchange returned no session");
                None
            }
        }
    }

    /// Revoke this device's session, clear, and navigate to login.
    pub async fn logout(&self) {
        self.inner.end_session(RevokeScope::Current).await;
    }

    /// Revoke every session of the account, clear, and navigate to login.
    pub async fn logout_all(&self) {
        self.inner.end_session(RevokeScope::All).await;
    }
}

impl Inner {
    fn read_slot(&self) -> RwLockReadGuard<'_, SessionSlot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, SessionSlot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_refresh(&self) -> MutexGuard<'_, Option<SharedRefresh>> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_authenticating(&self) -> AuthenticatingGuard<'_> {
        self.write_slot().authenticating = true;
        AuthenticatingGuard(self)
    }

    fn valid_token(&self) -> Option<AccessToken> {
        self.read_slot()
            .access_token
            .clone()
            .filter(|t| !t.is_expired(self.config.expiry_margin))
    }

    async fn save(&self, access_token: AccessToken, user_type: UserType, profile: UserProfile) {
        let legacy = self.config.legacy_token_mirror.then(|| access_token.clone());
        {
            let mut slot = self.write_slot();
            slot.access_token = Some(access_token);
            slot.user_type = Some(user_type);
            slot.profile = Some(profile.clone());
            slot.legacy_token = legacy.clone();
        }
        self.redirected.store(false, Ordering::SeqCst);

        if let Err(e) = self
            .host
            .markers()
            .save_user_markers(user_type, &profile, legacy.as_ref())
            .await
        {
            warn!(error = %e, "Failed to persist session markers");
        }
        debug!(%user_type, "Session saved");
    }

    /// Save a freshly issued session and its rotated refresh credential.
    async fn install(&self, session: Session, refresh: Option<RefreshToken>) {
        if let Some(refresh) = refresh {
            if let Err(e) = self.host.store_refresh_credential(&refresh).await {
                warn!(error = %e, "Failed to persist refresh credential");
            }
        }
        self.save(session.access_token, session.user_type, session.profile)
            .await;
    }

    async fn clear(&self) {
        *self.write_slot() = SessionSlot::default();
        self.client.forget_refresh_cookie();
        if let Err(e) = self.host.markers().clear().await {
            warn!(error = %e, "Failed to clear session markers");
        }
        debug!("Session cleared");
    }

    /// Navigate to login unless this session end already did.
    fn redirect_once(&self) {
        if !self.redirected.swap(true, Ordering::SeqCst) {
            self.navigator.redirect_to_login();
        }
    }

    #[instrument(skip(self))]
    async fn end_session(&self, scope: RevokeScope) {
        info!("Logging out");
        let token = self.read_slot().access_token.clone();
        let carrier = self.host.refresh_carrier().await.unwrap_or_else(|e| {
            warn!(error = %e, "Refresh credential unreadable during logout");
            None
        });

        if let Err(e) = self
            .client
            .revoke(scope, token.as_ref(), carrier.as_ref())
            .await
        {
            warn!(error = %e, "Server-side revoke failed; clearing locally");
        }

        self.clear().await;
        self.redirected.store(true, Ordering::SeqCst);
        self.navigator.redirect_to_login();
    }

    /// Join the refresh in flight, or start one.
    async fn refresh_shared(self: &Arc<Self>) -> RefreshOutcome {
        self.join_refresh(false).await
    }

    /// Like [`Inner::refresh_shared`], but a credential installed by a
    /// refresh that finished since the caller last looked is reused.
    async fn refresh_if_expired(self: &Arc<Self>) -> RefreshOutcome {
        self.join_refresh(true).await
    }

    async fn join_refresh(self: &Arc<Self>, reuse_valid: bool) -> RefreshOutcome {
        let refresh = {
            let mut slot = self.lock_refresh();
            match slot.as_ref() {
                Some(refresh) => {
                    debug!("Joining refresh in flight");
                    refresh.clone()
                }
                None => {
                    // The slot is emptied only after the new credential is
                    // installed, so this check cannot miss it.
                    if reuse_valid {
                        if let Some(token) = self.valid_token() {
                            debug!("Credential refreshed meanwhile");
                            return RefreshOutcome::Refreshed(token);
                        }
                    }

                    let inner = Arc::clone(self);
                    let refresh = async move {
                        let outcome = inner.run_refresh().await;
                        *inner.lock_refresh() = None;
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(refresh.clone());
                    refresh
                }
            }
        };
        refresh.await
    }

    #[instrument(skip(self))]
    async fn run_refresh(&self) -> RefreshOutcome {
        info!("Refreshing session");

        let carrier = match self.host.refresh_carrier().await {
            Ok(Some(carrier)) => carrier,
            Ok(None) => {
                info!("No refresh credential; session ends");
                self.clear().await;
                return RefreshOutcome::Rejected;
            }
            Err(e) => {
                warn!(error = %e, "Refresh credential unreadable");
                return RefreshOutcome::Failed;
            }
        };
        if matches!(carrier, RefreshCarrier::Explicit(_)) {
            debug!("Using stored refresh credential");
        }

        let response = match self.client.refresh(&carrier).await {
            Ok(response) => response,
            Err(e) if e.is_rejection() => {
                info!(error = %e, "Refresh rejected");
                self.clear().await;
                return RefreshOutcome::Rejected;
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed; keeping session");
                return RefreshOutcome::Failed;
            }
        };

        let fallback = self.read_slot().user_type;
        match response.into_session(fallback) {
            Ok((session, refresh)) => {
                let token = session.access_token.clone();
                self.install(session, refresh).await;
                info!("Session refreshed");
                RefreshOutcome::Refreshed(token)
            }
            Err(e) => {
                warn!(error = %e, "Malformed refresh response");
                RefreshOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("host", &self.inner.host.kind())
            .field("state", &self.state())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
