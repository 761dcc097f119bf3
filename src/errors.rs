use std::path::PathBuf;

use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

use crate::types::AuthorizationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("unable to read token store {}: {source}", .path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token store {} does not hold token data: {source}", .path.display())]
    StoreDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to write token store {}: {source}", .path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to reach token endpoint: {0}")]
    ReauthTransport(#[source] reqwest::Error),

    #[error("unable to re-authenticate: {code}: {description}")]
    ReauthRejected {
        code: AuthorizationError,
        description: String,
    },

    #[error("unable to re-authenticate for unknown reasons")]
    ReauthUnknown,

    #[error("malformed token endpoint response: {0}")]
    ReauthMalformedResponse(#[source] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid authorization header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("time arithmetic failed: {0}")]
    Time(#[from] jiff::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the refresh handshake itself, as opposed to the
    /// wrapped request or the token store.
    pub fn is_reauth(&self) -> bool {
        matches!(
            self,
            Error::ReauthTransport(_)
                | Error::ReauthRejected { .. }
                | Error::ReauthUnknown
                | Error::ReauthMalformedResponse(_)
        )
    }
}
