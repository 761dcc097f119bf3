use std::sync::Arc;

use egobee::{
    AuthorizingTransport, Client, Error, MemoryTokenStore, TokenDuration, TokenRefreshResponse,
    TokenStore,
};
use jiff::SignedDuration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token(access: &str, refresh: &str, expires_in: i64) -> TokenRefreshResponse {
    TokenRefreshResponse {
        access_token: access.into(),
        token_type: "Bearer".into(),
        expires_in: TokenDuration::from_secs(expires_in),
        refresh_token: refresh.into(),
        ..Default::default()
    }
}

fn client(server: &MockServer, store: Arc<dyn TokenStore>) -> Client {
    let transport = AuthorizingTransport::new(store, reqwest::Client::new(), "my-app")
        .with_token_url(format!("{}/token", server.uri()))
        .expect("valid token url");
    Client::from_transport(transport)
}

async fn mount_thermostat(server: &MockServer, bearer: &str, expect: u64) {
    Mock::given(method("GET"))
        .and(path("/1/thermostat"))
        .and(header("Authorization", bearer))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(expect)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fresh_token_is_sent_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    mount_thermostat(&server, "Bearer thisisanaccesstoken", 1).await;

    let store = MemoryTokenStore::new(&token("thisisanaccesstoken", "refresh", 1800)).unwrap();
    let client = client(&server, Arc::new(store));

    let resp = client
        .get(format!("{}/1/thermostat", server.uri()))
        .await
        .expect("request succeeds");
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn stale_token_refreshes_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(query_param("refresh_token", "old-refresh"))
        .and(query_param("client_id", "my-app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "new-access",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "new-refresh",
            "scope": "smartWrite",
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_thermostat(&server, "Bearer new-access", 1).await;

    let store = Arc::new(MemoryTokenStore::new(&token("", "old-refresh", 0)).unwrap());
    let client = client(&server, store.clone());

    let resp = client
        .get(format!("{}/1/thermostat", server.uri()))
        .await
        .expect("request succeeds");
    assert_eq!(resp.status(), 200);

    assert_eq!(store.access_token().await.unwrap(), "new-access");
    assert_eq!(store.refresh_token().await.unwrap(), "new-refresh");
    let valid_for = store.valid_for().await.unwrap();
    assert!(
        valid_for > SignedDuration::from_secs(3580) && valid_for <= SignedDuration::from_secs(3585),
        "valid_for = {valid_for:?}"
    );

    let requests = server.received_requests().await.expect("recording enabled");
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(paths, vec!["/token", "/1/thermostat"]);
    assert!(requests[0].body.is_empty(), "token request has no body");
}

#[tokio::test]
async fn rejected_refresh_never_reaches_target() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "expired",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/thermostat"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new(&token("", "old-refresh", 0)).unwrap();
    let client = client(&server, Arc::new(store));

    let err = client
        .get(format!("{}/1/thermostat", server.uri()))
        .await
        .expect_err("refresh is rejected");
    assert!(err.is_reauth());
    let msg = err.to_string();
    assert!(msg.contains("invalid_grant"), "{msg}");
    assert!(msg.contains("expired"), "{msg}");
}

#[tokio::test]
async fn malformed_token_response_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    mount_thermostat(&server, "Bearer never", 0).await;

    let store = MemoryTokenStore::new(&token("", "r", 0)).unwrap();
    let client = client(&server, Arc::new(store));

    let err = client
        .get(format!("{}/1/thermostat", server.uri()))
        .await
        .expect_err("body is not a token payload");
    assert!(matches!(err, Error::ReauthMalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_token_endpoint_is_transport_error() {
    let server = MockServer::start().await;
    mount_thermostat(&server, "Bearer never", 0).await;

    // grab a free port, then close it
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let store = MemoryTokenStore::new(&token("", "r", 0)).unwrap();
    let transport = AuthorizingTransport::new(Arc::new(store), reqwest::Client::new(), "my-app")
        .with_token_url(format!("http://{closed}/token"))
        .unwrap();
    let client = Client::from_transport(transport);

    let err = client
        .get(format!("{}/1/thermostat", server.uri()))
        .await
        .expect_err("token endpoint is down");
    assert!(matches!(err, Error::ReauthTransport(_)), "{err:?}");
    assert!(!err.to_string().contains("refresh_token="), "{err}");
}

#[tokio::test]
async fn target_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1/thermostat"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new(&token("a", "r", 3600)).unwrap();
    let client = client(&server, Arc::new(store));

    let resp = client
        .get(format!("{}/1/thermostat", server.uri()))
        .await
        .expect("non-2xx is still a response");
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn request_builder_keeps_caller_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/thermostat"))
        .and(header("Authorization", "Bearer a"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new(&token("a", "r", 3600)).unwrap();
    let client = client(&server, Arc::new(store));

    let builder = client
        .request(reqwest::Method::POST, format!("{}/1/thermostat", server.uri()))
        .json(&serde_json::json!({"functions": []}));
    let resp = client.send(builder).await.unwrap();
    assert_eq!(resp.status(), 200);
}
