//! read configuration from a file, the environment, or a secret

use std::path::PathBuf;

use aws_config::BehaviorVersion;
use reqwest::Url;

use crate::errors::Error;
use crate::token::{
    DEFAULT_EXPIRY_MARGIN, DEFAULT_REFRESH_THRESHOLD, RefreshPolicy, default_store_path,
};
use crate::transport::DEFAULT_TOKEN_URL;

pub enum ConfigLocation {
    File(String),
    Env,
    Secret,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    /// Application key registered with the vendor; sent as `client_id`.
    pub app_id: String,
    pub token_url: Option<String>,
    pub token_store_path: Option<String>,
    pub refresh_threshold_secs: Option<u64>,
    pub expiry_margin_secs: Option<u64>,
}

impl Config {
    pub fn from_values(
        app_id: impl Into<String>,
        token_url: Option<String>,
        token_store_path: Option<String>,
        refresh_threshold_secs: Option<u64>,
        expiry_margin_secs: Option<u64>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            token_url,
            token_store_path,
            refresh_threshold_secs,
            expiry_margin_secs,
        }
    }

    pub fn token_url(&self) -> Result<Url, Error> {
        let raw = self.token_url.as_deref().unwrap_or(DEFAULT_TOKEN_URL);
        Url::parse(raw).map_err(|e| Error::Config(format!("Invalid token URL '{}': {}", raw, e)))
    }

    pub fn refresh_policy(&self) -> Result<RefreshPolicy, Error> {
        let threshold = self
            .refresh_threshold_secs
            .unwrap_or(DEFAULT_REFRESH_THRESHOLD.as_secs() as u64);
        let margin = self
            .expiry_margin_secs
            .unwrap_or(DEFAULT_EXPIRY_MARGIN.as_secs() as u64);
        RefreshPolicy::from_secs(threshold, margin)
    }

    pub fn token_store_path(&self) -> PathBuf {
        self.token_store_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_store_path)
    }
}

pub async fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    match loc {
        ConfigLocation::File(path) => {
            let contents = tokio::fs::read_to_string(&path).await?;
            parse_config(&contents, &path)
        }
        ConfigLocation::Env => read_config_from_env(),
        ConfigLocation::Secret => {
            let secret_arn = std::env::var(SECRET_ARN_VAR)
                .map_err(|_| Error::Config(format!("Missing {} env var", SECRET_ARN_VAR)))?;
            let contents = fetch_secret_string(&secret_arn).await?;
            parse_config(&contents, &secret_arn)
        }
    }
}

const SECRET_ARN_VAR: &str = "EGOBEE_CONFIG_SECRET_ARN";

/// Parses a JSON config document; `origin` names where it came from.
fn parse_config(contents: &str, origin: &str) -> Result<Config, Error> {
    let config: Config = serde_json::from_str(contents)
        .map_err(|e| Error::Config(format!("Invalid config in '{}': {}", origin, e)))?;
    tracing::debug!(origin, app_id = %config.app_id, "config.loaded");
    Ok(config)
}

fn read_config_from_env() -> Result<Config, Error> {
    Ok(Config {
        app_id: std::env::var("EGOBEE_APP_ID")
            .map_err(|_| Error::Config("Missing EGOBEE_APP_ID env var".to_string()))?,
        token_url: std::env::var("EGOBEE_TOKEN_URL").ok(),
        token_store_path: std::env::var("EGOBEE_TOKEN_STORE_PATH").ok(),
        refresh_threshold_secs: env_secs("EGOBEE_REFRESH_THRESHOLD_SECS")?,
        expiry_margin_secs: env_secs("EGOBEE_EXPIRY_MARGIN_SECS")?,
    })
}

fn env_secs(name: &str) -> Result<Option<u64>, Error> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", name, raw, e))),
        Err(_) => Ok(None),
    }
}

async fn fetch_secret_string(secret_arn: &str) -> Result<String, Error> {
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let resp = aws_sdk_secretsmanager::Client::new(&sdk_config)
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Config(format!("Failed to fetch secret '{}': {}", secret_arn, e)))?;
    resp.secret_string()
        .map(str::to_string)
        .ok_or_else(|| Error::Config(format!("Secret '{}' has no string value", secret_arn)))
}
