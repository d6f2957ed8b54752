//! Embedded host: silent login and explicit refresh credentials.

mod common;

use std::sync::Arc;

use common::{INIT_DATA, embedded, jwt};
use serde_json::json;
use tvoydonor_core::store::MemoryStore;
use tvoydonor_core::{HostKind, KeyValueStore, UserType};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn session_body(token: &str, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "refresh_token": refresh,
        "user_type": "donor",
        "user": { "id": 42, "full_name": "Ivan Petrov" }
    })
}

#[tokio::test]
async fn silent_login_uses_stored_refresh_credential() {
    let cloud = Arc::new(MemoryStore::new());
    cloud.set("tvoydonor_refresh_token", "rt-1").await.unwrap();
    let h = embedded(cloud).await;
    let token = jwt(3600, "tg");

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-telegram"))
        .and(header("x-refresh-token", "rt-1"))
        .and(body_json(json!({ "refresh_token": "rt-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body(&token, "rt-2")))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/telegram"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&h.server)
        .await;

    assert_eq!(h.session.host_kind(), HostKind::EmbeddedHost);
    let session = h.session.silent_login().await.unwrap();

    assert_eq!(session.access_token.as_str(), token);
    assert_eq!(session.user_type, UserType::Donor);
    assert_eq!(
        h.store.peek("tvoydonor_refresh_token").as_deref(),
        Some("rt-2")
    );
    assert_eq!(h.store.peek("tvoydonor_user_type").as_deref(), Some("donor"));
    assert!(h.store.peek("user_type").is_none());
}

#[tokio::test]
async fn silent_login_falls_back_to_identity_exchange() {
    let cloud = Arc::new(MemoryStore::new());
    cloud.set("tvoydonor_refresh_token", "dead").await.unwrap();
    let h = embedded(cloud).await;
    let token = jwt(3600, "tg");

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-telegram"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/telegram"))
        .and(body_json(json!({ "init_data": INIT_DATA })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body(&token, "rt-new")))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = h.session.silent_login().await.unwrap();

    assert_eq!(session.access_token.as_str(), token);
    assert_eq!(
        h.store.peek("tvoydonor_refresh_token").as_deref(),
        Some("rt-new")
    );
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn silent_login_without_credential_exchanges_identity() {
    let h = embedded(Arc::new(MemoryStore::new())).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-telegram"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/telegram"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(session_body(&jwt(3600, "tg"), "rt-1")),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.session.silent_login().await.is_some());
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn silent_login_degrades_to_no_session() {
    let h = embedded(Arc::new(MemoryStore::unavailable())).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/telegram"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Invalid Telegram data"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.session.silent_login().await.is_none());
    assert!(!h.session.is_authenticated());
}

#[tokio::test]
async fn embedded_refresh_without_credential_ends_session() {
    let h = embedded(Arc::new(MemoryStore::new())).await;
    h.session
        .save(
            tvoydonor_core::AccessToken::new(jwt(-60, "expired")),
            UserType::Donor,
            tvoydonor_core::UserProfile::empty(),
        )
        .await;

    assert_eq!(h.session.get_token().await, None);
    assert_eq!(h.session.user_type(), None);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn embedded_logout_sends_refresh_credential() {
    let cloud = Arc::new(MemoryStore::new());
    cloud.set("tvoydonor_refresh_token", "rt-1").await.unwrap();
    let h = embedded(cloud).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("x-refresh-token", "rt-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    h.session.logout().await;

    assert_eq!(h.navigator.count(), 1);
    assert!(h.store.peek("tvoydonor_refresh_token").is_none());
}
