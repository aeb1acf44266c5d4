//! Remote version check that stops outdated copies of the tool.
use log::*;
use serde::Deserialize;

use crate::{FastlaneError, Result, http::traits::HttpClient};

/// Version this binary was built as.
pub const LOCAL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON document served by the version config endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub version: String,
}

/// Fetch the required version from `config_url` and compare it to `local`.
pub async fn check(
    http: &dyn HttpClient,
    config_url: &str,
    local: &str,
) -> Result<VersionDescriptor> {
    info!("checking required version at {config_url}");

    let response = http.get(config_url).await.map_err(|e| {
        FastlaneError::config_unreachable(config_url, e.to_string())
    })?;

    if response.status != 200 {
        return Err(FastlaneError::config_unreachable(
            config_url,
            format!("status {}", response.status),
        ));
    }

    let descriptor: VersionDescriptor = serde_json::from_str(&response.body)
        .map_err(|e| {
            FastlaneError::config_unreachable(
                config_url,
                format!("invalid version descriptor: {e}"),
            )
        })?;

    if descriptor.version != local {
        return Err(FastlaneError::VersionMismatch {
            local: local.to_string(),
            required: descriptor.version.clone(),
            hint: mismatch_hint(local, &descriptor.version),
        });
    }

    debug!("version {local} matches required version");

    Ok(descriptor)
}

fn mismatch_hint(local: &str, required: &str) -> String {
    match (
        semver::Version::parse(local.trim_start_matches('v')),
        semver::Version::parse(required.trim_start_matches('v')),
    ) {
        (Ok(local), Ok(required)) if local < required => {
            " (upgrade to continue)".into()
        }
        (Ok(local), Ok(required)) if local > required => {
            " (this build is newer than the published release)".into()
        }
        _ => "".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_direction_of_mismatch() {
        assert_eq!(mismatch_hint("1.0.0", "1.2.0"), " (upgrade to continue)");
        assert!(mismatch_hint("2.0.0", "1.2.0").contains("newer"));
        assert_eq!(mismatch_hint("1.0.0", "latest"), "");
    }
}
