//! Git workspace operations backed by libgit2.
//!
//! Opens the repository containing the working directory and performs the
//! handful of reads and writes the release flow needs:
//!
//! - Fetching remote branches and tags
//! - Creating, checking out and pushing branches with upstream tracking
//! - Reading the current branch, remote URL and unpushed commit count
//! - Probing, creating and pushing release tags
use git2::{BranchType, Direction, build::CheckoutBuilder};
use log::*;
use std::{cell::RefCell, path::Path};

use crate::{
    FastlaneError, Result,
    workspace::{auth, traits::Workspace},
};

/// Workspace implementation over a local `git2::Repository`.
pub struct GitWorkspace {
    /// Remote used for fetch, push and tag probing.
    remote: String,
    /// The underlying git2 repository instance.
    repo: git2::Repository,
}

impl GitWorkspace {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path, remote: &str) -> Result<Self> {
        let repo = git2::Repository::discover(path)
            .map_err(|e| FastlaneError::git("rev-parse --show-toplevel", e))?;

        debug!(
            "opened repository at {}",
            repo.workdir().unwrap_or(repo.path()).display()
        );

        Ok(Self {
            remote: remote.to_string(),
            repo,
        })
    }

    fn find_remote(&self, command: &str) -> Result<git2::Remote<'_>> {
        self.repo
            .find_remote(&self.remote)
            .map_err(|e| FastlaneError::git(command, e))
    }

    fn callbacks<'r>(&self) -> Result<git2::RemoteCallbacks<'r>> {
        Ok(auth::remote_callbacks(self.repo.config()?))
    }

    /// Push a single refspec, failing if the remote rejects the update.
    fn push_refspec(&self, refspec: &str, command: &str) -> Result<()> {
        let mut remote = self.find_remote(command)?;
        let rejected: RefCell<Option<String>> = RefCell::new(None);

        {
            let mut callbacks = self.callbacks()?;
            callbacks.push_update_reference(|refname, status| {
                if let Some(msg) = status {
                    *rejected.borrow_mut() = Some(format!("{refname}: {msg}"));
                }
                Ok(())
            });

            let mut push_options = git2::PushOptions::new();
            push_options.remote_callbacks(callbacks);

            remote
                .push(&[refspec], Some(&mut push_options))
                .map_err(|e| FastlaneError::git(command, e))?;
        }

        if let Some(msg) = rejected.into_inner() {
            return Err(FastlaneError::git(
                command,
                git2::Error::from_str(&format!("rejected {msg}")),
            ));
        }

        Ok(())
    }

    fn local_tag_exists(&self, name: &str) -> bool {
        self.repo
            .find_reference(&format!("refs/tags/{name}"))
            .is_ok()
    }

    fn remote_tag_exists(&self, name: &str) -> Result<bool> {
        let command = format!("ls-remote --tags {} {name}", self.remote);
        let mut remote = self.find_remote(&command)?;
        let connection = remote
            .connect_auth(Direction::Fetch, Some(self.callbacks()?), None)
            .map_err(|e| FastlaneError::git(&command, e))?;

        let refname = format!("refs/tags/{name}");
        let found = connection
            .list()
            .map_err(|e| FastlaneError::git(&command, e))?
            .iter()
            .any(|head| head.name() == refname);

        Ok(found)
    }
}

impl Workspace for GitWorkspace {
    fn fetch(&self, prune: bool) -> Result<()> {
        let command = if prune {
            format!("fetch --prune --tags {}", self.remote)
        } else {
            format!("fetch --tags {}", self.remote)
        };
        info!("git {command}");

        let mut remote = self.find_remote(&command)?;
        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(self.callbacks()?);
        fetch_options.download_tags(git2::AutotagOption::All);
        if prune {
            fetch_options.prune(git2::FetchPrune::On);
        }

        // empty refspecs use the remote's configured fetch refspecs
        let refspecs: &[&str] = &[];
        remote
            .fetch(refspecs, Some(&mut fetch_options), None)
            .map_err(|e| FastlaneError::git(&command, e))?;

        Ok(())
    }

    fn checkout_new_branch(&self, name: &str, from_ref: &str) -> Result<()> {
        let command = format!("checkout -b {name} {from_ref}");
        info!("git {command}");

        let commit = self
            .repo
            .revparse_single(from_ref)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| FastlaneError::git(&command, e))?;

        self.repo
            .branch(name, &commit, false)
            .map_err(|e| FastlaneError::git(&command, e))?;

        let ref_name = format!("refs/heads/{name}");
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();

        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(|e| FastlaneError::git(&command, e))?;
        self.repo
            .set_head(&ref_name)
            .map_err(|e| FastlaneError::git(&command, e))?;

        Ok(())
    }

    fn push_branch(&self, name: &str, set_upstream: bool) -> Result<()> {
        let command = if set_upstream {
            format!("push -u {} {name}", self.remote)
        } else {
            format!("push {} {name}", self.remote)
        };
        info!("git {command}");

        let refspec = format!("refs/heads/{name}:refs/heads/{name}");
        self.push_refspec(&refspec, &command)?;

        if set_upstream {
            let mut config = self.repo.config()?;
            config
                .set_str(&format!("branch.{name}.remote"), &self.remote)
                .map_err(|e| FastlaneError::git(&command, e))?;
            config
                .set_str(
                    &format!("branch.{name}.merge"),
                    &format!("refs/heads/{name}"),
                )
                .map_err(|e| FastlaneError::git(&command, e))?;
        }

        Ok(())
    }

    fn current_branch_name(&self) -> Result<String> {
        let command = "rev-parse --abbrev-ref HEAD";
        let head = self
            .repo
            .head()
            .map_err(|e| FastlaneError::git(command, e))?;

        if !head.is_branch() {
            return Err(FastlaneError::DetachedHead);
        }

        let name = head.shorthand().ok_or_else(|| {
            FastlaneError::git(
                command,
                git2::Error::from_str("branch name is not valid utf-8"),
            )
        })?;

        Ok(name.to_string())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        let command = format!("config --get remote.{remote}.url");
        let found = self
            .repo
            .find_remote(remote)
            .map_err(|e| FastlaneError::git(&command, e))?;

        let url = found.url().ok_or_else(|| {
            FastlaneError::git(
                &command,
                git2::Error::from_str("remote url is not valid utf-8"),
            )
        })?;

        Ok(url.to_string())
    }

    fn unpushed_commits(&self) -> Result<usize> {
        let name = self.current_branch_name()?;
        let command = format!("log @{{u}}..{name}");

        let branch = self
            .repo
            .find_branch(&name, BranchType::Local)
            .map_err(|e| FastlaneError::git(&command, e))?;

        let upstream = match branch.upstream() {
            Ok(upstream) => upstream,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                return Err(FastlaneError::NoUpstream(name));
            }
            Err(e) => return Err(FastlaneError::git(&command, e)),
        };

        let local = branch.get().peel_to_commit()?.id();
        let remote = upstream.get().peel_to_commit()?.id();

        let (ahead, _behind) = self
            .repo
            .graph_ahead_behind(local, remote)
            .map_err(|e| FastlaneError::git(&command, e))?;

        debug!("{name} is {ahead} commit(s) ahead of its upstream");

        Ok(ahead)
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        if self.local_tag_exists(name) {
            debug!("tag {name} exists locally");
            return Ok(true);
        }
        self.remote_tag_exists(name)
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let command = format!("tag {name}");
        info!("git {command}");

        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| FastlaneError::git(&command, e))?;

        self.repo
            .tag_lightweight(name, commit.as_object(), false)
            .map_err(|e| FastlaneError::git(&command, e))?;

        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        let command = format!("push {} {name}", self.remote);
        info!("git {command}");

        let refspec = format!("refs/tags/{name}:refs/tags/{name}");
        self.push_refspec(&refspec, &command)
    }

    fn validate_ref_name(&self, name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('-')
            && git2::Branch::name_is_valid(name).unwrap_or(false)
    }
}
