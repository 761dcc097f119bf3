use async_trait::async_trait;
use jiff::SignedDuration;
use tokio::sync::Mutex;

use crate::errors::Error;
use crate::types::TokenRefreshResponse;

/// Storage for the access and refresh tokens used by the authorizing transport.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// The current access token, empty when none is held.
    async fn access_token(&self) -> Result<String, Error>;

    /// The current refresh token.
    async fn refresh_token(&self) -> Result<String, Error>;

    /// How much longer the access token is valid. Negative once expired.
    async fn valid_for(&self) -> Result<SignedDuration, Error>;

    /// Replaces both tokens and the expiry with the contents of `response`.
    async fn update(&self, response: &TokenRefreshResponse) -> Result<(), Error>;

    /// Serializes refreshes of this store. Every transport sharing the store
    /// takes it before exchanging the refresh token, so a rotated refresh
    /// token is only ever sent once.
    fn refresh_lock(&self) -> &Mutex<()>;
}
