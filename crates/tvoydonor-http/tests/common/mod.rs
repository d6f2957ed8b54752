#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tvoydonor_core::store::MemoryStore;
use tvoydonor_core::{ApiUrl, IdentityPayload, Navigator};
use tvoydonor_http::{
    ApiClient, BrowserHost, ClientConfig, EmbeddedHost, SessionConfig, SessionManager,
};
use wiremock::MockServer;

pub const INIT_DATA: &str = "query_id=AAE&user=%7B%22id%22%3A42%7D&auth_date=1700000000&hash=abc";

/// Unsigned JWT expiring `exp_offset` seconds from now.
pub fn jwt(exp_offset: i64, sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let exp = chrono::Utc::now().timestamp() + exp_offset;
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "exp": exp }).to_string());
    format!("{header}.{payload}.signature")
}

/// Counts login redirects.
#[derive(Default)]
pub struct CountingNavigator(AtomicUsize);

impl CountingNavigator {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<CountingNavigator>,
    pub session: SessionManager,
}

pub fn api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}/api", server.address().port())).unwrap()
}

fn short_timeout() -> ClientConfig {
    ClientConfig {
        timeout: Some(std::time::Duration::from_secs(5)),
        ..ClientConfig::default()
    }
}

/// Standard host against a fresh mock server.
pub async fn browser() -> Harness {
    browser_with(SessionConfig::default()).await
}

pub async fn browser_with(config: SessionConfig) -> Harness {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(CountingNavigator::default());
    let client = ApiClient::with_config(api_url(&server), short_timeout()).unwrap();
    let session = SessionManager::with_config(
        client,
        Arc::new(BrowserHost::new(store.clone())),
        navigator.clone(),
        config,
    );
    Harness {
        server,
        store,
        navigator,
        session,
    }
}

/// Embedded host whose cloud store is `store`.
pub async fn embedded(store: Arc<MemoryStore>) -> Harness {
    let server = MockServer::start().await;
    let navigator = Arc::new(CountingNavigator::default());
    let client = ApiClient::with_config(api_url(&server), short_timeout()).unwrap();
    let host = EmbeddedHost::new(store.clone(), IdentityPayload::new(INIT_DATA));
    let session = SessionManager::new(client, Arc::new(host), navigator.clone());
    Harness {
        server,
        store,
        navigator,
        session,
    }
}

/// Standard host pointed at a port nothing listens on.
pub fn unreachable() -> (Arc<MemoryStore>, Arc<CountingNavigator>, SessionManager) {
    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(CountingNavigator::default());
    let client = ApiClient::with_config(
        ApiUrl::new("http://127.0.0.1:9/api").unwrap(),
        short_timeout(),
    )
    .unwrap();
    let session = SessionManager::new(
        client,
        Arc::new(BrowserHost::new(store.clone())),
        navigator.clone(),
    );
    (store, navigator, session)
}

pub fn refresh_body(token: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "user_type": "donor",
        "user": { "id": 1, "full_name": "Anna Ivanova" }
    })
}
