//! Backend HTTP client with a cookie jar.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace, warn};
use tvoydonor_core::error::{AuthError, Error, ProtocolError, TransportError};
use tvoydonor_core::{
    AccessToken, ApiUrl, DonorCredentials, IdentityPayload, MedicalCenterCredentials,
    RefreshCarrier, Result,
};
use url::Url;

use crate::endpoints::{
    ApiErrorResponse, DONOR_LOGIN, IDENTITY_EXCHANGE, IdentityExchangeRequest, LOGOUT, LOGOUT_ALL,
    MEDCENTER_LOGIN, REFRESH, REFRESH_COOKIE, REFRESH_EMBEDDED, REFRESH_TOKEN_HEADER,
    RefreshRequest, SessionResponse,
};
use crate::request::ApiRequest;

/// HTTP client settings.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Whole-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("tvoydonor/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Which sessions a revoke call ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevokeScope {
    /// This device only.
    Current,
    /// Every device of the account.
    All,
}

impl RevokeScope {
    fn path(self) -> &'static str {
        match self {
            RevokeScope::Current => LOGOUT,
            RevokeScope::All => LOGOUT_ALL,
        }
    }
}

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn map_reqwest(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::Decode { message }
    } else if err.is_connect() || err.is_request() {
        TransportError::Connection { message }
    } else {
        TransportError::Http { message }
    };
    transport.into()
}

/// HTTP client for the backend API.
///
/// Every call goes through one cookie jar, so the HTTP-only refresh cookie
/// set by login and refresh responses is resent on the next refresh.
/// Cloning shares the connection pool and the jar.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    api: ApiUrl,
}

impl ApiClient {
    /// Create a client with default settings.
    pub fn new(api: ApiUrl) -> Result<Self> {
        Self::with_config(api, ClientConfig::default())
    }

    pub fn with_config(api: ApiUrl, config: ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .cookie_provider(Arc::clone(&jar));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(map_reqwest)?;

        Ok(Self { client, jar, api })
    }

    /// Returns the API base this client talks to.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Send a request as-is. The response status is not checked.
    #[instrument(skip(self, request, token), fields(method = %request.method, path = %request.path))]
    pub async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response> {
        let url = self.api.endpoint(&request.path);
        debug!(authed = token.is_some(), "API request");

        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = builder.send().await.map_err(map_reqwest)?;
        trace!(status = %response.status(), "API response");
        Ok(response)
    }

    #[instrument(skip(self, credentials), fields(full_name = %credentials.full_name()))]
    pub async fn login_donor(&self, credentials: &DonorCredentials) -> Result<SessionResponse> {
        self.post_json(DONOR_LOGIN, credentials)
            .await
            .map_err(login_error)
    }

    #[instrument(skip(self, credentials), fields(medical_center_id = credentials.medical_center_id()))]
    pub async fn login_medical_center(
        &self,
        credentials: &MedicalCenterCredentials,
    ) -> Result<SessionResponse> {
        self.post_json(MEDCENTER_LOGIN, credentials)
            .await
            .map_err(login_error)
    }

    /// Exchange the refresh credential for a new session.
    #[instrument(skip(self, carrier))]
    pub async fn refresh(&self, carrier: &RefreshCarrier) -> Result<SessionResponse> {
        let response = match carrier {
            RefreshCarrier::CookieJar => {
                debug!("Refreshing with cookie");
                self.client
                    .post(self.api.endpoint(REFRESH))
                    .send()
                    .await
            }
            RefreshCarrier::Explicit(token) => {
                debug!("Refreshing with explicit credential");
                self.client
                    .post(self.api.endpoint(REFRESH_EMBEDDED))
                    .header(REFRESH_TOKEN_HEADER, token.as_str())
                    .json(&RefreshRequest {
                        refresh_token: token.as_str(),
                    })
                    .send()
                    .await
            }
        }
        .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Ask the backend to revoke the current session, or every session.
    #[instrument(skip(self, token, carrier))]
    pub async fn revoke(
        &self,
        scope: RevokeScope,
        token: Option<&AccessToken>,
        carrier: Option<&RefreshCarrier>,
    ) -> Result<()> {
        let mut builder = self.client.post(self.api.endpoint(scope.path()));
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(RefreshCarrier::Explicit(refresh)) = carrier {
            builder = builder
                .header(REFRESH_TOKEN_HEADER, refresh.as_str())
                .json(&RefreshRequest {
                    refresh_token: refresh.as_str(),
                });
        }

        let response = builder.send().await.map_err(map_reqwest)?;
        if response.status().is_success() {
            debug!("Session revoked");
            Ok(())
        } else {
            Err(self.parse_error_response(response).await.into())
        }
    }

    /// Exchange a host identity payload for a session.
    #[instrument(skip(self, payload))]
    pub async fn exchange_identity(&self, payload: &IdentityPayload) -> Result<SessionResponse> {
        self.post_json(
            IDENTITY_EXCHANGE,
            &IdentityExchangeRequest {
                init_data: payload.as_str(),
            },
        )
        .await
    }

    /// Cookies the jar would send to the refresh endpoint, as a
    /// `name=value; name2=value2` header string.
    pub fn export_cookies(&self) -> Option<String> {
        let url = self.cookie_url()?;
        let header = self.jar.cookies(&url)?;
        header.to_str().ok().map(str::to_string)
    }

    /// Load cookies previously returned by [`ApiClient::export_cookies`].
    pub fn import_cookies(&self, header: &str) {
        let Some(url) = self.cookie_url() else {
            return;
        };
        for pair in header.split(';').map(str::trim).filter(|p| p.contains('=')) {
            self.jar.add_cookie_str(&format!("{}; Path=/", pair), &url);
        }
    }

    /// Expire the refresh cookie locally.
    pub fn forget_refresh_cookie(&self) {
        if let Some(url) = self.cookie_url() {
            self.jar
                .add_cookie_str(&format!("{}=; Max-Age=0; Path=/", REFRESH_COOKIE), &url);
        }
    }

    fn cookie_url(&self) -> Option<Url> {
        match Url::parse(&self.api.endpoint(REFRESH)) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "Cannot build cookie URL");
                None
            }
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.api.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Parse a success body, or turn the failure into a protocol error.
    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            response.json::<R>().await.map_err(map_reqwest)
        } else {
            Err(self.parse_error_response(response).await.into())
        }
    }

    /// Parse a backend error body. Non-JSON bodies yield a bare status.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ApiErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.error, body.code, body.message),
            Err(_) => ProtocolError::new(status, None, None, None),
        }
    }
}

/// Login refusals become `InvalidCredentials` carrying the backend's message.
fn login_error(err: Error) -> Error {
    match err {
        Error::Protocol(protocol) if matches!(protocol.status, 400 | 401 | 403) => {
            let message = protocol
                .error
                .or(protocol.message)
                .unwrap_or_else(|| "login refused".to_string());
            AuthError::InvalidCredentials(message).into()
        }
        other => other,
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api", &self.api)
            .field("cookies", &"[REDACTED]")
            .finish()
    }
}
