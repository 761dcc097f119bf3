use jiff::SignedDuration;

use crate::errors::Error;

/// Remaining validity below which a request refreshes the token first.
pub const DEFAULT_REFRESH_THRESHOLD: SignedDuration = SignedDuration::from_secs(15);

/// Subtracted from `expires_in` when a store records a new token, to absorb
/// network and processing latency.
pub const DEFAULT_EXPIRY_MARGIN: SignedDuration = SignedDuration::from_secs(15);

/// Business rules governing proactive refresh behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Minimum acceptable time-to-expiry before forcing a refresh.
    pub threshold: SignedDuration,
    /// Safety margin subtracted from the endpoint's declared expiry.
    pub expiry_margin: SignedDuration,
}

impl RefreshPolicy {
    pub fn new(threshold: SignedDuration, expiry_margin: SignedDuration) -> Result<Self, Error> {
        if threshold.is_negative() {
            return Err(Error::Config("Refresh threshold must be >= 0".into()));
        }
        if expiry_margin.is_negative() {
            return Err(Error::Config("Expiry margin must be >= 0".into()));
        }
        Ok(Self {
            threshold,
            expiry_margin,
        })
    }

    /// Builds a policy from whole seconds, as found in configuration files.
    pub fn from_secs(threshold_secs: u64, expiry_margin_secs: u64) -> Result<Self, Error> {
        let to_signed = |secs: u64| {
            i64::try_from(secs)
                .map(SignedDuration::from_secs)
                .map_err(|_| Error::Config(format!("{secs} seconds is out of range")))
        };
        Self::new(to_signed(threshold_secs)?, to_signed(expiry_margin_secs)?)
    }

    /// A token is stale when it is unset or about to expire.
    pub fn is_stale(&self, access_token: &str, valid_for: SignedDuration) -> bool {
        valid_for < self.threshold || access_token.is_empty()
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_REFRESH_THRESHOLD,
            expiry_margin: DEFAULT_EXPIRY_MARGIN,
        }
    }
}
