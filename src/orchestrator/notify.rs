//! Jenkins notifyCommit trigger.
use log::*;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{FastlaneError, Result, http::traits::HttpClient};

/// Build `<jenkins>/git/notifyCommit?url=<repo>[&token=<token>]`.
pub fn notify_url(
    jenkins_url: &str,
    repo_url: &str,
    token: Option<&SecretString>,
) -> Result<Url> {
    let base = jenkins_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/git/notifyCommit"))?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("url", repo_url);
        if let Some(token) = token {
            query.append_pair("token", token.expose_secret());
        }
    }

    Ok(url)
}

/// Ask jenkins to poll `repo_url`, returning the raw response body.
pub async fn notify_commit(
    http: &dyn HttpClient,
    jenkins_url: &str,
    repo_url: &str,
    token: Option<&SecretString>,
) -> Result<String> {
    let url = notify_url(jenkins_url, repo_url, token)?;
    let mut endpoint = url.clone();
    endpoint.set_query(None);
    let display = endpoint.to_string();

    info!("notifying {display} of {repo_url}");

    let response = http
        .get(url.as_str())
        .await
        .map_err(|e| FastlaneError::notify_failed(&display, e.to_string()))?;

    if !response.is_success() {
        return Err(FastlaneError::notify_failed(
            &display,
            format!("status {}: {}", response.status, response.body.trim()),
        ));
    }

    Ok(response.body)
}
