use std::sync::Arc;

use egobee::{
    Client, Config, MemoryTokenStore, PersistentTokenStore, TokenDuration, TokenRefreshResponse,
    TokenStore,
};
use jiff::SignedDuration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stale() -> TokenRefreshResponse {
    TokenRefreshResponse {
        access_token: "stale".into(),
        refresh_token: "old-refresh".into(),
        expires_in: TokenDuration::from_secs(5),
        ..Default::default()
    }
}

async fn mount(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(query_param("client_id", "cfg-app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "configured",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "new-refresh",
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/thermostat"))
        .and(header("Authorization", "Bearer configured"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn zero_margin_from_config_reaches_memory_store() {
    let server = MockServer::start().await;
    mount(&server).await;
    let config = Config::from_values(
        "cfg-app",
        Some(format!("{}/token", server.uri())),
        None,
        None,
        Some(0),
    );

    let store = Arc::new(MemoryTokenStore::from_config(&config, &stale()).unwrap());
    let client = Client::from_config(&config, store.clone()).unwrap();
    let resp = client
        .get(format!("{}/1/thermostat", server.uri()))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let valid_for = store.valid_for().await.unwrap();
    assert!(valid_for > SignedDuration::from_secs(3595), "{valid_for:?}");
}

#[tokio::test]
async fn persistent_store_uses_configured_path_and_margin() {
    let server = MockServer::start().await;
    mount(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("tokens.json");
    let config = Config::from_values(
        "cfg-app",
        Some(format!("{}/token", server.uri())),
        Some(store_path.to_string_lossy().to_string()),
        None,
        Some(0),
    );

    let store = Arc::new(PersistentTokenStore::from_config(&config, &stale()).await.unwrap());
    assert_eq!(store.path(), store_path.as_path());
    let client = Client::from_config(&config, store.clone()).unwrap();
    client
        .get(format!("{}/1/thermostat", server.uri()))
        .await
        .unwrap();

    let reopened = PersistentTokenStore::open(&store_path).await.unwrap();
    assert_eq!(reopened.access_token().await.unwrap(), "configured");
    let valid_for = reopened.valid_for().await.unwrap();
    assert!(valid_for > SignedDuration::from_secs(3595), "{valid_for:?}");
}
