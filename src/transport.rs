use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, Method, Request, Response, Url};

use crate::errors::Error;
use crate::reauth::ReauthOutcome;
use crate::telemetry::reauth::ReauthTelemetry;
use crate::token::{RefreshPolicy, TokenStore};

pub const DEFAULT_TOKEN_URL: &str = "https://api.ecobee.com/token";

/// Sends a fully built request. Implemented for `reqwest::Client`; tests and
/// callers can wrap their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, reqwest::Error>;
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
        Client::execute(self, request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
        (**self).execute(request).await
    }
}

/// Decorates requests with the bearer token from a [`TokenStore`], refreshing
/// the token through the vendor's token endpoint first when it is stale.
///
/// Concurrent requests that find the token stale wait on a single refresh:
/// the first one exchanges the refresh token, the others re-check the store
/// once it is done and go ahead with the new token. The wait happens on the
/// store's [`TokenStore::refresh_lock`], so transports sharing one store
/// coalesce as well.
pub struct AuthorizingTransport<T = Client> {
    store: Arc<dyn TokenStore>,
    transport: T,
    app_id: String,
    token_url: String,
    policy: RefreshPolicy,
}

impl<T: Transport> AuthorizingTransport<T> {
    pub fn new(store: Arc<dyn TokenStore>, transport: T, app_id: impl Into<String>) -> Self {
        Self {
            store,
            transport,
            app_id: app_id.into(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            policy: RefreshPolicy::default(),
        }
    }

    /// Points reauthentication at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Result<Self, Error> {
        let token_url = token_url.into();
        Url::parse(&token_url)
            .map_err(|e| Error::Config(format!("Invalid token URL '{}': {}", token_url, e)))?;
        self.token_url = token_url;
        Ok(self)
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Sends `request` with an `Authorization: Bearer` header, reauthenticating
    /// first if needed. When reauthentication fails the request is not sent.
    pub async fn intercept(&self, mut request: Request) -> Result<Response, Error> {
        self.ensure_fresh().await?;
        let access_token = self.store.access_token().await?;
        let mut value = HeaderValue::from_str(&format!("Bearer {access_token}"))?;
        value.set_sensitive(true);
        request.headers_mut().append(AUTHORIZATION, value);
        Ok(self.transport.execute(request).await?)
    }

    /// True when the access token is unset or expires within the policy threshold.
    pub async fn should_reauth(&self) -> Result<bool, Error> {
        let valid_for = self.store.valid_for().await?;
        let access_token = self.store.access_token().await?;
        Ok(self.policy.is_stale(&access_token, valid_for))
    }

    /// Exchanges the refresh token for a new token pair regardless of staleness.
    pub async fn reauth(&self) -> Result<(), Error> {
        let _lock = self.store.refresh_lock().lock().await;
        self.refresh(&ReauthTelemetry::new("reauth.forced")).await
    }

    async fn ensure_fresh(&self) -> Result<(), Error> {
        if !self.should_reauth().await? {
            return Ok(());
        }
        let telemetry = ReauthTelemetry::new("reauth.stale");
        // Only one refresh attempt should run at a time.
        let _lock = self.store.refresh_lock().lock().await;
        if !self.should_reauth().await? {
            telemetry.emit_coalesced();
            return Ok(());
        }
        self.refresh(&telemetry).await
    }

    /// Caller must hold the store's refresh lock.
    async fn refresh(&self, telemetry: &ReauthTelemetry) -> Result<(), Error> {
        let start = Instant::now();
        telemetry.emit_start(&self.token_url);
        let result = self.exchange_refresh_token().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => telemetry.emit_success(elapsed_ms),
            Err(err) => telemetry.emit_failure(err, elapsed_ms),
        }
        result
    }

    async fn exchange_refresh_token(&self) -> Result<(), Error> {
        let refresh_token = self.store.refresh_token().await?;
        let url = token_request_url(&self.token_url, &refresh_token, &self.app_id)?;
        let response = self
            .transport
            .execute(Request::new(Method::POST, url))
            .await
            // the URL carries the refresh token
            .map_err(|e| Error::ReauthTransport(e.without_url()))?;
        let token = ReauthOutcome::from_response(response)
            .await?
            .into_result()?;
        self.store.update(&token).await
    }
}

fn token_request_url(token_url: &str, refresh_token: &str, app_id: &str) -> Result<Url, Error> {
    let mut url = Url::parse(token_url)
        .map_err(|e| Error::Config(format!("Invalid token URL '{}': {}", token_url, e)))?;
    url.query_pairs_mut()
        .append_pair("grant_type", "refresh_token")
        .append_pair("refresh_token", refresh_token)
        .append_pair("client_id", app_id);
    Ok(url)
}
