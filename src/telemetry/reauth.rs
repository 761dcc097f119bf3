use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

/// Structured events for one reauthentication attempt.
#[derive(Clone, Debug)]
pub struct ReauthTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl ReauthTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, token_url: &str) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            token_url,
            "reauth.start"
        );
    }

    pub fn emit_success(&self, elapsed_ms: u64) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            elapsed_ms,
            "reauth.success"
        );
    }

    /// Another request finished the refresh while this one waited for it.
    pub fn emit_coalesced(&self) {
        event!(
            Level::DEBUG,
            attempt_id = %self.attempt_id,
            context = %self.context,
            "reauth.coalesced"
        );
    }

    pub fn emit_failure(&self, error: &Error, elapsed_ms: u64) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            elapsed_ms,
            error = %error,
            "reauth.failure"
        );
    }
}
