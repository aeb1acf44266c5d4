//! Error types for fastlane-release.
//!
//! Every gate in the release flow has its own variant so the final report
//! names the failing step together with the branch, command, or status code
//! that caused it.

use thiserror::Error;

/// Main error type for fastlane-release operations.
#[derive(Error, Debug)]
pub enum FastlaneError {
    // Cli args / configuration errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Branch creation
    #[error("'{0}' is not a valid branch name")]
    InvalidRef(String),

    // Version gate
    #[error("Unable to reach version config at {url}: {reason}")]
    ConfigUnreachable { url: String, reason: String },

    #[error(
        "fastlane-release {local} is out of date: {required} is required{hint}"
    )]
    VersionMismatch {
        local: String,
        required: String,
        hint: String,
    },

    // Workspace gates
    #[error("Refusing to release from protected branch '{0}'")]
    ProtectedBranch(String),

    #[error(
        "Branch '{branch}' has {count} commit(s) not pushed to its upstream: push them first"
    )]
    UnsyncedCommits { branch: String, count: usize },

    #[error("Branch '{0}' has no upstream branch: push it with tracking first")]
    NoUpstream(String),

    #[error("Detached HEAD: check out a branch before releasing")]
    DetachedHead,

    // Build notification
    #[error("Build notification to {url} failed: {reason}")]
    NotifyFailed { url: String, reason: String },

    // Git failures annotated with the command that failed
    #[error("git {command} failed: {source}")]
    GitCommand {
        command: String,
        #[source]
        source: git2::Error,
    },

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(String),

    // Parsing errors - automatic conversions via #[from]
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using FastlaneError
pub type Result<T> = std::result::Result<T, FastlaneError>;

impl FastlaneError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Annotate a git2 failure with the git command it stands in for
    pub fn git(command: impl Into<String>, source: git2::Error) -> Self {
        Self::GitCommand {
            command: command.into(),
            source,
        }
    }

    pub fn config_unreachable(
        url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ConfigUnreachable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn notify_failed(
        url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::NotifyFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for FastlaneError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for reqwest errors (network/API)
impl From<reqwest::Error> for FastlaneError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkError(err.to_string())
    }
}
