//! reqwest backed HTTP client.
use async_trait::async_trait;
use log::*;
use std::time::Duration;

use crate::{
    Result,
    http::traits::{HttpClient, HttpResponse},
};

const USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!("GET {}", redact_query(url));
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("response status: {status}");
        Ok(HttpResponse { status, body })
    }
}

/// Strip the query string so tokens never reach the logs.
fn redact_query(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_query_strings() {
        assert_eq!(
            redact_query("https://ci/git/notifyCommit?url=x&token=y"),
            "https://ci/git/notifyCommit"
        );
        assert_eq!(redact_query("https://cfg/v.json"), "https://cfg/v.json");
    }

    #[test]
    fn success_range() {
        let ok = HttpResponse {
            status: 204,
            body: "".into(),
        };
        let not_found = HttpResponse {
            status: 404,
            body: "".into(),
        };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = ReqwestClient::new(Duration::from_millis(500)).unwrap();
        let result = client.get("http://127.0.0.1:9/version.json").await;
        assert!(matches!(
            result,
            Err(crate::FastlaneError::NetworkError(_))
        ));
    }
}
