use std::sync::Arc;

use reqwest::{IntoUrl, Method, Request, RequestBuilder, Response};
use tracing::debug;

use crate::{
    Client,
    config::Config,
    errors::Error,
    token::TokenStore,
    transport::{AuthorizingTransport, Transport},
};

impl Client {
    /// Create a new Client using the default HTTP transport, token endpoint
    /// and refresh policy.
    /// # Arguments
    /// * `app_id` - The application key registered with the vendor
    /// * `store` - Where the access and refresh tokens live
    pub fn new(app_id: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        let http = reqwest::Client::new();
        Self::from_transport(AuthorizingTransport::new(store, http, app_id))
    }

    /// Create a new Client from explicit configuration, typically loaded via
    /// [`read_config`](crate::read_config).
    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, Error> {
        let transport = AuthorizingTransport::new(store, reqwest::Client::new(), &config.app_id)
            .with_token_url(config.token_url()?)?
            .with_policy(config.refresh_policy()?);
        debug!(
            app_id = %config.app_id,
            token_url = %transport.token_url(),
            "client.configured"
        );
        Ok(Self::from_transport(transport))
    }
}

impl<T: Transport> Client<T> {
    pub fn from_transport(transport: AuthorizingTransport<T>) -> Self {
        Self {
            transport: Arc::new(transport),
            builder: reqwest::Client::new(),
        }
    }

    pub fn transport(&self) -> &AuthorizingTransport<T> {
        &self.transport
    }

    /// Starts a request; finish it with [`Client::send`].
    pub fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        self.builder.request(method, url)
    }

    pub async fn get(&self, url: impl IntoUrl) -> Result<Response, Error> {
        self.send(self.request(Method::GET, url)).await
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        self.execute(request.build()?).await
    }

    pub async fn execute(&self, request: Request) -> Result<Response, Error> {
        self.transport.intercept(request).await
    }
}
