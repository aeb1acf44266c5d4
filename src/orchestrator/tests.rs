//! Tests for the orchestrator module.
//!
//! Test organization:
//! - `common`: Shared test utilities and helper functions
//! - `create_branch`: Branch creation tests
//! - `release_workflow`: Workspace gates, tag gate and notification tests
//! - `version_check`: Required version gate and version printing tests

mod common;
