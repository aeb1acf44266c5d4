//! Local version-control workspace access.
//!
//! The release flow only ever talks to git through the [`traits::Workspace`]
//! trait; [`git::GitWorkspace`] implements it on top of libgit2.

/// Credential callbacks for network operations.
pub mod auth;

/// libgit2 backed workspace.
pub mod git;

/// Trait describing every git operation the release flow needs.
pub mod traits;
