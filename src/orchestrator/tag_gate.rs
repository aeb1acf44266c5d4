//! Release tag naming and uniqueness probing.
use log::*;

use crate::{Result, workspace::traits::Workspace};

/// `<prefix>-<user>-<branch>`
pub fn base_tag_name(prefix: &str, user: &str, branch: &str) -> String {
    format!("{prefix}-{user}-{branch}")
}

/// Find the first of `base`, `base-1`, `base-2`, ... that is not yet a tag.
///
/// Check-then-act: a tag pushed by someone else between this probe and our
/// push makes the push fail.
pub fn next_available_tag(
    workspace: &dyn Workspace,
    base: &str,
) -> Result<String> {
    let mut candidate = base.to_string();
    let mut suffix: u32 = 0;

    while workspace.tag_exists(&candidate)? {
        debug!("tag {candidate} already exists");
        suffix += 1;
        candidate = format!("{base}-{suffix}");
    }

    Ok(candidate)
}

/// Drop a trailing `.git` from a remote URL.
pub fn normalize_remote_url(url: &str) -> String {
    let url = url.trim();
    url.strip_suffix(".git").unwrap_or(url).to_string()
}
