//! Configuration loading and parsing for `fastlane.toml` files.
//!
//! Values are layered: environment overrides, then the config file, then
//! the invoking system user, then built-in defaults.
use merge::Merge;
use secrecy::SecretString;
use serde::Deserialize;
use std::{env, fs, path::Path, time::Duration};

use crate::{FastlaneError, Result};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "fastlane.toml";
/// Remote used for fetching, pushing and reading the repository URL.
pub const DEFAULT_REMOTE: &str = "origin";
/// Remote branch that new fastlane branches are cut from.
pub const DEFAULT_PRODUCTION_REF: &str = "production";
/// Prefix of every release tag.
pub const DEFAULT_TAG_PREFIX: &str = "fastlane";
/// Branches that can never be tagged for release.
pub const DEFAULT_PROTECTED_BRANCHES: [&str; 4] =
    ["master", "deploy", "test", "production"];
/// Seconds to wait between pushing a tag and notifying jenkins.
pub const DEFAULT_NOTIFY_DELAY_SECS: u64 = 5;
/// Timeout applied to every HTTP request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Environment variable overriding the user embedded in tag names.
pub const USER_ENV_VAR: &str = "FASTLANE_USER";
/// Environment variable holding the jenkins notifyCommit access token.
pub const NOTIFY_TOKEN_ENV_VAR: &str = "FASTLANE_NOTIFY_TOKEN";

/// Which set of endpoints a run talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Production,
    Test,
}

/// Version config and jenkins URLs for one target.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    /// URL serving the `{"version": "..."}` descriptor.
    pub config_url: String,
    /// Jenkins base URL; `git/notifyCommit` is appended.
    pub jenkins_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub production: EndpointConfig,
    pub test: EndpointConfig,
}

/// One partially specified layer of configuration, as read from the config
/// file or the environment.
#[derive(Debug, Clone, Default, Deserialize, Merge)]
#[serde(default)]
pub struct ConfigLayer {
    #[merge(strategy = merge::option::overwrite_none)]
    pub remote: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    pub production_ref: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    pub protected_branches: Option<Vec<String>>,
    #[merge(strategy = merge::option::overwrite_none)]
    pub tag_prefix: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    pub notify_delay_secs: Option<u64>,
    #[merge(strategy = merge::option::overwrite_none)]
    pub http_timeout_secs: Option<u64>,
    #[merge(strategy = merge::option::overwrite_none)]
    pub user: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    pub notify_token: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    pub endpoints: Option<Endpoints>,
}

impl ConfigLayer {
    /// Parse a layer from TOML content.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read the config file. An explicit path must exist; the default file
    /// is optional.
    pub fn from_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    FastlaneError::invalid_config(format!(
                        "unable to read {}: {e}",
                        path.display()
                    ))
                })?;
                Self::from_toml(&content)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    log::debug!("{DEFAULT_CONFIG_FILE} not found: using defaults");
                    return Ok(Self::default());
                }
                let content = fs::read_to_string(path)?;
                Self::from_toml(&content)
            }
        }
    }

    /// Layer built from `FASTLANE_*` environment variables.
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            user: lookup(USER_ENV_VAR).filter(|v| !v.is_empty()),
            notify_token: lookup(NOTIFY_TOKEN_ENV_VAR)
                .filter(|v| !v.is_empty()),
            ..Default::default()
        }
    }

    /// Layer holding only the login name of the invoking user.
    pub fn from_system_user<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            user: lookup("USER")
                .filter(|v| !v.is_empty())
                .or_else(|| lookup("USERNAME").filter(|v| !v.is_empty())),
            ..Default::default()
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub remote: String,
    pub production_ref: String,
    pub protected_branches: Vec<String>,
    pub tag_prefix: String,
    pub notify_delay: Duration,
    pub http_timeout: Duration,
    pub user: Option<String>,
    pub notify_token: Option<SecretString>,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        ConfigLayer::default().into()
    }
}

impl From<ConfigLayer> for Config {
    fn from(layer: ConfigLayer) -> Self {
        Self {
            remote: layer.remote.unwrap_or_else(|| DEFAULT_REMOTE.into()),
            production_ref: layer
                .production_ref
                .unwrap_or_else(|| DEFAULT_PRODUCTION_REF.into()),
            protected_branches: layer.protected_branches.unwrap_or_else(|| {
                DEFAULT_PROTECTED_BRANCHES
                    .iter()
                    .map(|b| b.to_string())
                    .collect()
            }),
            tag_prefix: layer
                .tag_prefix
                .unwrap_or_else(|| DEFAULT_TAG_PREFIX.into()),
            notify_delay: Duration::from_secs(
                layer.notify_delay_secs.unwrap_or(DEFAULT_NOTIFY_DELAY_SECS),
            ),
            http_timeout: Duration::from_secs(
                layer.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            user: layer.user,
            notify_token: layer.notify_token.map(SecretString::from),
            endpoints: layer.endpoints.unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment and config file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| env::var(key).ok())
    }

    /// Load configuration resolving environment variables through `lookup`.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layer = ConfigLayer::from_env(&lookup);
        layer.merge(ConfigLayer::from_file(path)?);
        layer.merge(ConfigLayer::from_system_user(&lookup));
        Ok(layer.into())
    }

    pub fn endpoint(&self, target: Target) -> &EndpointConfig {
        match target {
            Target::Production => &self.endpoints.production,
            Target::Test => &self.endpoints.test,
        }
    }

    /// URL of the version descriptor for `target`.
    pub fn config_url(&self, target: Target) -> Result<&str> {
        let url = self.endpoint(target).config_url.as_str();
        if url.is_empty() {
            return Err(FastlaneError::invalid_config(format!(
                "endpoints.{}.config_url is not set",
                target_key(target)
            )));
        }
        Ok(url)
    }

    /// Jenkins base URL for `target`.
    pub fn jenkins_url(&self, target: Target) -> Result<&str> {
        let url = self.endpoint(target).jenkins_url.as_str();
        if url.is_empty() {
            return Err(FastlaneError::invalid_config(format!(
                "endpoints.{}.jenkins_url is not set",
                target_key(target)
            )));
        }
        Ok(url)
    }

    /// User embedded in tag names.
    pub fn tag_user(&self) -> Result<&str> {
        self.user.as_deref().ok_or_else(|| {
            FastlaneError::invalid_config(format!(
                "unable to determine user: set {USER_ENV_VAR} or `user` in {DEFAULT_CONFIG_FILE}"
            ))
        })
    }

    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches.iter().any(|b| b == branch)
    }
}

fn target_key(target: Target) -> &'static str {
    match target {
        Target::Production => "production",
        Target::Test => "test",
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use std::{collections::HashMap, io::Write};
    use tempfile::NamedTempFile;

    use super::*;

    fn lookup_from(
        vars: &[(&str, &str)],
    ) -> Box<dyn Fn(&str) -> Option<String>> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Box::new(move |key| vars.get(key).cloned())
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_defaults() {
        let config = Config::default();
        assert_eq!(config.remote, DEFAULT_REMOTE);
        assert_eq!(config.production_ref, DEFAULT_PRODUCTION_REF);
        assert_eq!(config.tag_prefix, DEFAULT_TAG_PREFIX);
        assert_eq!(config.notify_delay, Duration::from_secs(5));
        for branch in DEFAULT_PROTECTED_BRANCHES {
            assert!(config.is_protected(branch));
        }
        assert!(!config.is_protected("TICKET-1"));
    }

    #[test]
    fn parses_toml_file() {
        let file = write_config(
            r#"
remote = "upstream"
notify_delay_secs = 0

[endpoints.production]
config_url = "https://config.example.com/fastlane.json"
jenkins_url = "https://jenkins.example.com"

[endpoints.test]
config_url = "https://config-test.example.com/fastlane.json"
jenkins_url = "https://jenkins-test.example.com/"
"#,
        );

        let config = Config::load_with(Some(file.path()), lookup_from(&[]))
            .unwrap();

        assert_eq!(config.remote, "upstream");
        assert_eq!(config.notify_delay, Duration::ZERO);
        assert_eq!(
            config.config_url(Target::Test).unwrap(),
            "https://config-test.example.com/fastlane.json"
        );
        assert_eq!(
            config.jenkins_url(Target::Production).unwrap(),
            "https://jenkins.example.com"
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = Config::load_with(
            Some(Path::new("/nonexistent/fastlane.toml")),
            lookup_from(&[]),
        );
        assert!(matches!(result, Err(FastlaneError::InvalidConfig(_))));
    }

    #[test]
    fn unset_endpoint_is_an_error() {
        let config = Config::default();
        let err = config.jenkins_url(Target::Test).unwrap_err();
        assert!(err.to_string().contains("endpoints.test.jenkins_url"));
    }

    #[test]
    fn env_overrides_file_and_file_overrides_system_user() {
        let file = write_config("user = \"from-file\"\n");

        let config = Config::load_with(
            Some(file.path()),
            lookup_from(&[("USER", "alice")]),
        )
        .unwrap();
        assert_eq!(config.tag_user().unwrap(), "from-file");

        let config = Config::load_with(
            Some(file.path()),
            lookup_from(&[("USER", "alice"), (USER_ENV_VAR, "bob")]),
        )
        .unwrap();
        assert_eq!(config.tag_user().unwrap(), "bob");
    }

    #[test]
    fn falls_back_to_system_user() {
        let file = write_config("");

        let config = Config::load_with(
            Some(file.path()),
            lookup_from(&[("USERNAME", "carol")]),
        )
        .unwrap();
        assert_eq!(config.tag_user().unwrap(), "carol");

        let config =
            Config::load_with(Some(file.path()), lookup_from(&[])).unwrap();
        assert!(config.tag_user().is_err());
    }

    #[test]
    fn reads_notify_token_from_env() {
        let file = write_config("");
        let config = Config::load_with(
            Some(file.path()),
            lookup_from(&[(NOTIFY_TOKEN_ENV_VAR, "s3cret")]),
        )
        .unwrap();
        assert_eq!(
            config.notify_token.as_ref().unwrap().expose_secret(),
            "s3cret"
        );
    }
}
