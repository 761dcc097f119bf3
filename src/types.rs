use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::token::TokenDuration;

/// Payload returned by the token endpoint on a successful refresh.
/// See https://www.ecobee.com/home/developer/api/documentation/v1/auth/token-refresh.shtml
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: TokenDuration,
    pub refresh_token: String,
    pub scope: Scope,
}

impl FromStr for TokenRefreshResponse {
    type Err = Error;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Payload returned by the token endpoint alongside a non-2xx status.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationErrorResponse {
    pub error: AuthorizationError,
    pub error_description: String,
    pub error_uri: String,
}

impl FromStr for AuthorizationErrorResponse {
    type Err = Error;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Error codes reported by the vendor's authorization endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthorizationError {
    AccessDenied,
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
    NotSupported,
    AccountLocked,
    AccountDisabled,
    AuthorizationPending,
    AuthorizationExpired,
    SlowDown,
    /// Any code not listed above, kept verbatim. Empty when the payload had none.
    Other(String),
}

impl AuthorizationError {
    pub fn as_str(&self) -> &str {
        match self {
            AuthorizationError::AccessDenied => "access_denied",
            AuthorizationError::InvalidRequest => "invalid_request",
            AuthorizationError::InvalidClient => "invalid_client",
            AuthorizationError::InvalidGrant => "invalid_grant",
            AuthorizationError::UnauthorizedClient => "unauthorized_client",
            AuthorizationError::UnsupportedGrantType => "unsupported_grant_type",
            AuthorizationError::InvalidScope => "invalid_scope",
            AuthorizationError::NotSupported => "not_supported",
            AuthorizationError::AccountLocked => "account_locked",
            AuthorizationError::AccountDisabled => "account_disabled",
            AuthorizationError::AuthorizationPending => "authorization_pending",
            AuthorizationError::AuthorizationExpired => "authorization_expired",
            AuthorizationError::SlowDown => "slow_down",
            AuthorizationError::Other(code) => code,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl Default for AuthorizationError {
    fn default() -> Self {
        AuthorizationError::Other(String::new())
    }
}

impl From<String> for AuthorizationError {
    fn from(code: String) -> Self {
        match code.as_str() {
            "access_denied" => AuthorizationError::AccessDenied,
            "invalid_request" => AuthorizationError::InvalidRequest,
            "invalid_client" => AuthorizationError::InvalidClient,
            "invalid_grant" => AuthorizationError::InvalidGrant,
            "unauthorized_client" => AuthorizationError::UnauthorizedClient,
            "unsupported_grant_type" => AuthorizationError::UnsupportedGrantType,
            "invalid_scope" => AuthorizationError::InvalidScope,
            "not_supported" => AuthorizationError::NotSupported,
            "account_locked" => AuthorizationError::AccountLocked,
            "account_disabled" => AuthorizationError::AccountDisabled,
            "authorization_pending" => AuthorizationError::AuthorizationPending,
            "authorization_expired" => AuthorizationError::AuthorizationExpired,
            "slow_down" => AuthorizationError::SlowDown,
            _ => AuthorizationError::Other(code),
        }
    }
}

impl From<AuthorizationError> for String {
    fn from(code: AuthorizationError) -> Self {
        match code {
            AuthorizationError::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission scope granted to a token.
/// See https://www.ecobee.com/home/developer/api/documentation/v1/auth/auth-intro.shtml
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    SmartRead,
    SmartWrite,
    EmsWrite,
    Other(String),
}

impl Scope {
    pub fn as_str(&self) -> &str {
        match self {
            Scope::SmartRead => "smartRead",
            Scope::SmartWrite => "smartWrite",
            Scope::EmsWrite => "ems",
            Scope::Other(scope) => scope,
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Other(String::new())
    }
}

impl From<String> for Scope {
    fn from(scope: String) -> Self {
        match scope.as_str() {
            "smartRead" => Scope::SmartRead,
            "smartWrite" => Scope::SmartWrite,
            "ems" => Scope::EmsWrite,
            _ => Scope::Other(scope),
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Other(scope) => scope,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
