//! Command execution for fastlane-release.
//!
//! Dispatches the resolved [`Mode`] to the matching operation:
//!
//! - **help**: print usage and exit
//! - **version**: print the version and run the required version check
//! - **branch**: cut, check out and push a new fastlane branch
//! - **release**: tag the current branch, push the tag and notify jenkins
//!
//! Help never touches the network or the workspace, and version only needs
//! the network, so both run outside a git repository.
use log::*;
use std::{env, rc::Rc};

use crate::{
    Result,
    cli::{self, Args, Invocation, Mode},
    config::Config,
    http::client::ReqwestClient,
    orchestrator::{self, Orchestrator},
    workspace::git::GitWorkspace,
};

/// Execute the operation selected by `invocation`.
pub async fn execute(args: &Args, invocation: Invocation) -> Result<()> {
    if invocation.mode == Mode::ShowHelp {
        return cli::print_help();
    }

    let config = Rc::new(Config::load(args.config.as_deref())?);
    let http = ReqwestClient::new(config.http_timeout)?;

    if invocation.mode == Mode::PrintVersion {
        return orchestrator::print_version(&http, &config, invocation.target)
            .await;
    }

    let workspace = GitWorkspace::discover(&env::current_dir()?, &config.remote)?;

    let dry_run = matches!(invocation.mode, Mode::Release { dry_run: true });

    let orchestrator = Orchestrator::builder()
        .config(Rc::clone(&config))
        .workspace(Box::new(workspace))
        .http(Box::new(http))
        .target(invocation.target)
        .force(invocation.force)
        .dry_run(dry_run)
        .build()?;

    match invocation.mode {
        Mode::CreateBranch(name) => orchestrator.create_branch(&name),
        Mode::Release { .. } => {
            let summary = orchestrator.release().await?;
            if summary.dry_run {
                info!("dry run complete for {}", summary.tag);
            } else {
                info!("released {}", summary.tag);
            }
            Ok(())
        }
        Mode::ShowHelp | Mode::PrintVersion => Ok(()),
    }
}
