//! Tag, push and announce fastlane releases from a local git workspace.
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod workspace;

pub use error::{FastlaneError, Result};

#[cfg(test)]
pub mod test_helpers;
