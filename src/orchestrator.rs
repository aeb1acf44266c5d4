//! Release orchestration: branch creation, version gate, tag gate and
//! build notification run as one linear sequence of steps.
//!
//! Every step either succeeds or aborts the whole run. Nothing is retried
//! and nothing already pushed is rolled back.
use derive_builder::Builder;
use log::*;
use std::rc::Rc;

use crate::{
    FastlaneError, Result,
    config::{Config, Target},
    http::traits::HttpClient,
    workspace::traits::Workspace,
};

pub mod notify;
pub mod tag_gate;
pub mod version_gate;

/// Outcome of a release run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub tag: String,
    pub repo_url: String,
    pub dry_run: bool,
    pub notify_response: String,
}

#[derive(Builder)]
#[builder(pattern = "owned", build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    #[builder(setter(into))]
    pub config: Rc<Config>,
    pub workspace: Box<dyn Workspace>,
    pub http: Box<dyn HttpClient>,
    #[builder(default)]
    pub target: Target,
    #[builder(default)]
    pub force: bool,
    #[builder(default)]
    pub dry_run: bool,
}

impl OrchestratorParamsBuilder {
    pub fn build(self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            FastlaneError::invalid_config(format!(
                "Failed to build orchestrator: {}",
                e
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

pub struct Orchestrator {
    config: Rc<Config>,
    workspace: Box<dyn Workspace>,
    http: Box<dyn HttpClient>,
    target: Target,
    force: bool,
    dry_run: bool,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            config: params.config,
            workspace: params.workspace,
            http: params.http,
            target: params.target,
            force: params.force,
            dry_run: params.dry_run,
        }
    }

    /// Cut `name` from the remote production branch, check it out and push
    /// it with upstream tracking.
    pub fn create_branch(&self, name: &str) -> Result<()> {
        if !self.workspace.validate_ref_name(name) {
            return Err(FastlaneError::InvalidRef(name.to_string()));
        }

        let from_ref =
            format!("{}/{}", self.config.remote, self.config.production_ref);

        info!("creating branch {name} from {from_ref}");

        self.workspace.fetch(true)?;
        self.workspace.checkout_new_branch(name, &from_ref)?;
        self.workspace.push_branch(name, true)?;

        info!("branch {name} pushed to {}", self.config.remote);

        Ok(())
    }

    /// Tag the current branch, push the tag and notify jenkins.
    pub async fn release(&self) -> Result<ReleaseSummary> {
        if self.force {
            warn!("skipping required version check");
        } else {
            let config_url = self.config.config_url(self.target)?;
            version_gate::check(
                self.http.as_ref(),
                config_url,
                version_gate::LOCAL_VERSION,
            )
            .await?;
        }

        // resolve everything needed later before touching the remote
        let jenkins_url = self.config.jenkins_url(self.target)?;
        let user = self.config.tag_user()?;

        info!("refreshing tags from {}", self.config.remote);
        self.workspace.fetch(true)?;

        let branch = self.workspace.current_branch_name()?;
        let repo_url = tag_gate::normalize_remote_url(
            &self.workspace.remote_url(&self.config.remote)?,
        );
        info!("releasing branch {branch} of {repo_url}");

        if self.config.is_protected(&branch) {
            return Err(FastlaneError::ProtectedBranch(branch));
        }

        let unpushed = self.workspace.unpushed_commits()?;
        if unpushed > 0 {
            return Err(FastlaneError::UnsyncedCommits {
                branch,
                count: unpushed,
            });
        }

        let base =
            tag_gate::base_tag_name(&self.config.tag_prefix, user, &branch);
        let tag = tag_gate::next_available_tag(self.workspace.as_ref(), &base)?;

        if self.dry_run {
            info!("dry run: not creating tag {tag}");
            println!("git tag {tag}");
            println!("git push {} {tag}", self.config.remote);
        } else {
            self.workspace.create_tag(&tag)?;
            self.workspace.push_tag(&tag)?;
            info!("pushed tag {tag}");
        }

        if !self.config.notify_delay.is_zero() {
            debug!(
                "waiting {}s for the tag to register upstream",
                self.config.notify_delay.as_secs()
            );
            tokio::time::sleep(self.config.notify_delay).await;
        }

        let notify_response = notify::notify_commit(
            self.http.as_ref(),
            jenkins_url,
            &repo_url,
            self.config.notify_token.as_ref(),
        )
        .await?;

        println!("{notify_response}");

        Ok(ReleaseSummary {
            tag,
            repo_url,
            dry_run: self.dry_run,
            notify_response,
        })
    }
}

/// Print the local version, then check it against the required version for
/// `target`.
pub async fn print_version(
    http: &dyn HttpClient,
    config: &Config,
    target: Target,
) -> Result<()> {
    println!("{} {}", env!("CARGO_PKG_NAME"), version_gate::LOCAL_VERSION);
    let config_url = config.config_url(target)?;
    version_gate::check(http, config_url, version_gate::LOCAL_VERSION).await?;
    info!("up to date");
    Ok(())
}

#[cfg(test)]
mod tests;
