use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::types::TokenRefreshResponse;

/// The access/refresh token pair held by a store, plus the instant the
/// access token stops being usable.
///
/// This is also the on-disk shape of [`PersistentTokenStore`](super::PersistentTokenStore):
/// `{"accessToken": ..., "refreshToken": ..., "validUntil": "<RFC 3339>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub valid_until: Timestamp,
}

impl TokenRecord {
    /// Builds a record from a refresh payload, expiring `expiry_margin` ahead
    /// of what the endpoint declared.
    pub fn from_response(
        response: &TokenRefreshResponse,
        expiry_margin: SignedDuration,
    ) -> Result<Self, Error> {
        Ok(Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            valid_until: valid_until(Timestamp::now(), response, expiry_margin)?,
        })
    }

    /// Time left until `valid_until`, negative once it has passed.
    pub fn valid_for(&self, now: Timestamp) -> SignedDuration {
        self.valid_until.duration_since(now)
    }
}

fn valid_until(
    now: Timestamp,
    response: &TokenRefreshResponse,
    expiry_margin: SignedDuration,
) -> Result<Timestamp, Error> {
    let lifetime = response
        .expires_in
        .as_signed()
        .checked_sub(expiry_margin)
        .ok_or_else(|| Error::InvalidDuration(format!("{} overflows", response.expires_in)))?;
    Ok(now.checked_add(lifetime)?)
}
