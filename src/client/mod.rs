use std::sync::Arc;

use crate::transport::AuthorizingTransport;

mod impls;

/// HTTP client for the vendor API. Every request goes through an
/// [`AuthorizingTransport`], so callers never handle tokens directly.
pub struct Client<T = reqwest::Client> {
    transport: Arc<AuthorizingTransport<T>>,
    builder: reqwest::Client,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            builder: self.builder.clone(),
        }
    }
}
