use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::errors::Error;
use crate::types::TokenRefreshResponse;

use super::{DEFAULT_EXPIRY_MARGIN, RefreshPolicy, TokenRecord, TokenStore};

/// Token store with no persistence; tokens live as long as the process.
#[derive(Debug)]
pub struct MemoryTokenStore {
    record: RwLock<TokenRecord>,
    expiry_margin: SignedDuration,
    refresh_lock: Mutex<()>,
}

impl MemoryTokenStore {
    pub fn new(initial: &TokenRefreshResponse) -> Result<Self, Error> {
        Self::with_expiry_margin(initial, DEFAULT_EXPIRY_MARGIN)
    }

    pub fn with_expiry_margin(
        initial: &TokenRefreshResponse,
        expiry_margin: SignedDuration,
    ) -> Result<Self, Error> {
        Ok(Self {
            record: RwLock::new(TokenRecord::from_response(initial, expiry_margin)?),
            expiry_margin,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn with_policy(initial: &TokenRefreshResponse, policy: RefreshPolicy) -> Result<Self, Error> {
        Self::with_expiry_margin(initial, policy.expiry_margin)
    }

    /// Uses the expiry margin from `config`.
    pub fn from_config(config: &Config, initial: &TokenRefreshResponse) -> Result<Self, Error> {
        Self::with_policy(initial, config.refresh_policy()?)
    }

    /// Copy of the record currently held.
    pub async fn snapshot(&self) -> TokenRecord {
        self.record.read().await.clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Result<String, Error> {
        Ok(self.record.read().await.access_token.clone())
    }

    async fn refresh_token(&self) -> Result<String, Error> {
        Ok(self.record.read().await.refresh_token.clone())
    }

    async fn valid_for(&self) -> Result<SignedDuration, Error> {
        Ok(self.record.read().await.valid_for(Timestamp::now()))
    }

    async fn update(&self, response: &TokenRefreshResponse) -> Result<(), Error> {
        let updated = TokenRecord::from_response(response, self.expiry_margin)?;
        *self.record.write().await = updated;
        Ok(())
    }

    fn refresh_lock(&self) -> &Mutex<()> {
        &self.refresh_lock
    }
}
