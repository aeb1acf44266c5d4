//! Common test helper functions shared across test modules.
use std::time::Duration;

use crate::config::{Config, EndpointConfig, Endpoints};

/// Creates a test Config pointing at example endpoints, tagging as `alice`
/// and without the notify delay.
///
/// # Example
/// ```ignore
/// let config = create_test_config();
/// ```
pub fn create_test_config() -> Config {
    Config {
        user: Some("alice".to_string()),
        notify_delay: Duration::ZERO,
        endpoints: Endpoints {
            production: EndpointConfig {
                config_url: "https://config.example.com/version.json"
                    .to_string(),
                jenkins_url: "https://jenkins.example.com".to_string(),
            },
            test: EndpointConfig {
                config_url: "https://config-test.example.com/version.json"
                    .to_string(),
                jenkins_url: "https://jenkins-test.example.com".to_string(),
            },
        },
        ..Config::default()
    }
}
