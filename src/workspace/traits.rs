//! Traits related to the local git workspace
#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Git operations used by the release flow. Every method maps to a single
/// git command run against the current working copy and its remote.
#[cfg_attr(test, automock)]
pub trait Workspace {
    /// `git fetch [--prune] --tags <remote>`
    fn fetch(&self, prune: bool) -> Result<()>;
    /// `git checkout -b <name> <from_ref>`
    fn checkout_new_branch(&self, name: &str, from_ref: &str) -> Result<()>;
    /// `git push [-u] <remote> <name>`
    fn push_branch(&self, name: &str, set_upstream: bool) -> Result<()>;
    /// `git rev-parse --abbrev-ref HEAD`
    fn current_branch_name(&self) -> Result<String>;
    /// `git config --get remote.<remote>.url`
    fn remote_url(&self, remote: &str) -> Result<String>;
    /// Number of commits on the current branch missing from its upstream.
    fn unpushed_commits(&self) -> Result<usize>;
    /// Whether `refs/tags/<name>` exists locally or on the remote.
    fn tag_exists(&self, name: &str) -> Result<bool>;
    /// `git tag <name>`
    fn create_tag(&self, name: &str) -> Result<()>;
    /// `git push <remote> <name>`
    fn push_tag(&self, name: &str) -> Result<()>;
    /// `git check-ref-format --branch <name>`
    fn validate_ref_name(&self, name: &str) -> bool;
}
