//! Classification of token endpoint responses.

use reqwest::Response;

use crate::errors::Error;
use crate::types::{AuthorizationErrorResponse, TokenRefreshResponse};

/// Result of a refresh attempt: either the new token payload or the vendor's
/// error payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReauthOutcome {
    pub(crate) err: Option<AuthorizationErrorResponse>,
    pub(crate) resp: Option<TokenRefreshResponse>,
}

impl ReauthOutcome {
    pub fn success(resp: TokenRefreshResponse) -> Self {
        Self {
            err: None,
            resp: Some(resp),
        }
    }

    pub fn failure(err: AuthorizationErrorResponse) -> Self {
        Self {
            err: Some(err),
            resp: None,
        }
    }

    /// Parses a token endpoint response. 2xx bodies are read as a refresh
    /// payload, anything else as an error payload. A body that fits neither
    /// is an error in its own right.
    pub async fn from_response(response: Response) -> Result<Self, Error> {
        let status = response.status();
        let body = response.bytes().await.map_err(Error::ReauthTransport)?;
        Self::from_parts(status.is_success(), &body)
    }

    pub(crate) fn from_parts(success: bool, body: &[u8]) -> Result<Self, Error> {
        if success {
            serde_json::from_slice(body)
                .map(Self::success)
                .map_err(Error::ReauthMalformedResponse)
        } else {
            serde_json::from_slice(body)
                .map(Self::failure)
                .map_err(Error::ReauthMalformedResponse)
        }
    }

    /// True only when the refresh payload is present and the error payload is not.
    pub fn ok(&self) -> bool {
        self.err.is_none() && self.resp.is_some()
    }

    pub fn token(&self) -> Option<&TokenRefreshResponse> {
        self.resp.as_ref()
    }

    pub fn vendor_error(&self) -> Option<&AuthorizationErrorResponse> {
        self.err.as_ref()
    }

    /// Descriptive error for a failed outcome.
    pub fn as_error(&self) -> Error {
        match &self.err {
            Some(err) if !err.error.is_empty() && !err.error_description.is_empty() => {
                Error::ReauthRejected {
                    code: err.error.clone(),
                    description: err.error_description.clone(),
                }
            }
            _ => Error::ReauthUnknown,
        }
    }

    pub fn into_result(self) -> Result<TokenRefreshResponse, Error> {
        if !self.ok() {
            return Err(self.as_error());
        }
        self.resp.ok_or(Error::ReauthUnknown)
    }
}
