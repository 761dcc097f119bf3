use std::sync::Arc;
use std::time::Duration;

use egobee::{AuthorizingTransport, Client, MemoryTokenStore, TokenDuration, TokenRefreshResponse};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stale_store() -> MemoryTokenStore {
    MemoryTokenStore::new(&TokenRefreshResponse {
        access_token: "stale".into(),
        refresh_token: "refresh".into(),
        expires_in: TokenDuration::from_secs(20),
        ..Default::default()
    })
    .unwrap()
}

async fn mount(server: &MockServer, api_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "access_token": "race-renewed",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "refresh_token": "next",
                }))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/thermostat"))
        .and(header("Authorization", "Bearer race-renewed"))
        .respond_with(ResponseTemplate::new(200))
        .expect(api_calls)
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> Client {
    let transport = AuthorizingTransport::new(Arc::new(stale_store()), reqwest::Client::new(), "app")
        .with_token_url(format!("{}/token", server.uri()))
        .unwrap();
    Client::from_transport(transport)
}

#[tokio::test(flavor = "current_thread")]
async fn refresh_race_coalesced() {
    let server = MockServer::start().await;
    mount(&server, 3).await;
    let client = client(&server);
    let url = format!("{}/1/thermostat", server.uri());

    let (a, b, c) = tokio::join!(
        client.get(url.as_str()),
        client.get(url.as_str()),
        client.get(url.as_str()),
    );

    assert_eq!(a.unwrap().status(), 200);
    assert_eq!(b.unwrap().status(), 200);
    assert_eq!(c.unwrap().status(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refresh_race_coalesced_across_threads() {
    let server = MockServer::start().await;
    mount(&server, 8).await;
    let client = client(&server);
    let url = format!("{}/1/thermostat", server.uri());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            let url = url.clone();
            tokio::spawn(async move { client.get(url).await })
        })
        .collect();
    for handle in handles {
        let resp = handle.await.expect("task completes").expect("request succeeds");
        assert_eq!(resp.status(), 200);
    }
}

#[tokio::test(flavor = "current_thread")]
async fn forced_reauth_always_calls_endpoint() {
    let server = MockServer::start().await;
    mount(&server, 0).await;
    let client = client(&server);

    client.transport().reauth().await.unwrap();
    assert!(!client.transport().should_reauth().await.unwrap());
}

#[tokio::test(flavor = "current_thread")]
async fn clients_sharing_a_store_refresh_once() {
    let server = MockServer::start().await;
    mount(&server, 2).await;
    let store = Arc::new(stale_store());
    let token_url = format!("{}/token", server.uri());
    let first = Client::from_transport(
        AuthorizingTransport::new(store.clone(), reqwest::Client::new(), "app")
            .with_token_url(token_url.as_str())
            .unwrap(),
    );
    let second = Client::from_transport(
        AuthorizingTransport::new(store.clone(), reqwest::Client::new(), "app")
            .with_token_url(token_url.as_str())
            .unwrap(),
    );
    let url = format!("{}/1/thermostat", server.uri());

    let (a, b) = tokio::join!(first.get(url.as_str()), second.get(url.as_str()));

    assert_eq!(a.unwrap().status(), 200);
    assert_eq!(b.unwrap().status(), 200);
}
