//! Traits related to HTTP endpoints
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Status code and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request. Non-success statuses are returned, not raised;
    /// only transport failures are errors.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}
