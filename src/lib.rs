//! Authenticated HTTP client for the ecobee REST API.
//!
//! Requests made through [`Client`] carry the current access token as a
//! bearer header. When the token is missing or about to expire, the refresh
//! token is exchanged at the vendor's token endpoint first and the new pair is
//! written back to the [`TokenStore`](token::TokenStore).

mod client;
pub mod config;
pub mod errors;
pub mod reauth;
pub mod telemetry;
pub mod token;
pub mod transport;
pub mod types;

pub use client::Client;
pub use config::{Config, ConfigLocation, read_config};
pub use errors::Error;
pub use reauth::ReauthOutcome;
pub use token::{MemoryTokenStore, PersistentTokenStore, RefreshPolicy, TokenDuration, TokenStore};
pub use transport::{AuthorizingTransport, DEFAULT_TOKEN_URL, Transport};
pub use types::{AuthorizationError, AuthorizationErrorResponse, Scope, TokenRefreshResponse};
