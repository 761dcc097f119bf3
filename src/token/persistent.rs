use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::Error;
use crate::types::TokenRefreshResponse;

use super::{DEFAULT_EXPIRY_MARGIN, TokenRecord, TokenStore};

/// File name used under the system temp dir when no path is given.
pub const DEFAULT_STORE_FILE: &str = "tokenStore";

pub fn default_store_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_STORE_FILE)
}

/// Token store backed by a JSON file.
///
/// Every operation reloads the record from disk before touching it, so the
/// file is the source of truth and other store instances pointed at the same
/// path observe each other's updates. Writes go to a sibling temporary file
/// that is renamed into place. There is no cross-process locking, and
/// refreshes are only serialized per instance: share one instance behind an
/// `Arc` rather than opening the same path twice.
#[derive(Debug)]
pub struct PersistentTokenStore {
    path: PathBuf,
    record: RwLock<TokenRecord>,
    expiry_margin: SignedDuration,
    refresh_lock: Mutex<()>,
}

impl PersistentTokenStore {
    /// Creates the store at `path`, writing `initial` to it.
    pub async fn new(
        path: impl Into<PathBuf>,
        initial: &TokenRefreshResponse,
    ) -> Result<Self, Error> {
        Self::with_expiry_margin(path, initial, DEFAULT_EXPIRY_MARGIN).await
    }

    pub async fn with_expiry_margin(
        path: impl Into<PathBuf>,
        initial: &TokenRefreshResponse,
        expiry_margin: SignedDuration,
    ) -> Result<Self, Error> {
        let record = TokenRecord::from_response(initial, expiry_margin)?;
        let store = Self {
            path: path.into(),
            record: RwLock::new(record.clone()),
            expiry_margin,
            refresh_lock: Mutex::new(()),
        };
        {
            let _writer = store.record.write().await;
            store.persist(&record).await?;
        }
        Ok(store)
    }

    /// Opens a store from a file written earlier, without seeding it.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let record = read_record(&path).await?;
        Ok(Self {
            path,
            record: RwLock::new(record),
            expiry_margin: DEFAULT_EXPIRY_MARGIN,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Creates the store at the configured path with the configured expiry margin.
    pub async fn from_config(config: &Config, initial: &TokenRefreshResponse) -> Result<Self, Error> {
        let policy = config.refresh_policy()?;
        Self::with_expiry_margin(config.token_store_path(), initial, policy.expiry_margin).await
    }

    /// Sets the margin applied to subsequent updates.
    pub fn expiry_margin(mut self, expiry_margin: SignedDuration) -> Self {
        self.expiry_margin = expiry_margin;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn reload(&self) -> Result<(), Error> {
        let record = read_record(&self.path).await.inspect_err(|err| {
            warn!(path = %self.path.display(), error = %err, "token_store.reload_failed");
        })?;
        *self.record.write().await = record;
        Ok(())
    }

    /// Caller must hold the write lock.
    async fn persist(&self, record: &TokenRecord) -> Result<(), Error> {
        let data = serde_json::to_vec(record)?;
        let write_err = |source: std::io::Error| Error::StoreWrite {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, &data).await.map_err(write_err)?;
        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(source));
        }
        debug!(path = %self.path.display(), bytes = data.len(), "token_store.persisted");
        Ok(())
    }
}

#[async_trait]
impl TokenStore for PersistentTokenStore {
    async fn access_token(&self) -> Result<String, Error> {
        self.reload().await?;
        Ok(self.record.read().await.access_token.clone())
    }

    async fn refresh_token(&self) -> Result<String, Error> {
        self.reload().await?;
        Ok(self.record.read().await.refresh_token.clone())
    }

    async fn valid_for(&self) -> Result<SignedDuration, Error> {
        self.reload().await?;
        Ok(self.record.read().await.valid_for(Timestamp::now()))
    }

    async fn update(&self, response: &TokenRefreshResponse) -> Result<(), Error> {
        let updated = TokenRecord::from_response(response, self.expiry_margin)?;
        let mut writer = self.record.write().await;
        self.persist(&updated).await.inspect_err(|err| {
            warn!(path = %self.path.display(), error = %err, "token_store.write_failed");
        })?;
        *writer = updated;
        Ok(())
    }

    fn refresh_lock(&self) -> &Mutex<()> {
        &self.refresh_lock
    }
}

async fn read_record(path: &Path) -> Result<TokenRecord, Error> {
    let data = tokio::fs::read(path).await.map_err(|source| Error::StoreRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| Error::StoreDecode {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_STORE_FILE.into());
    name.push(".tmp");
    path.with_file_name(name)
}
