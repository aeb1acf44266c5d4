//! Common test utilities for orchestrator tests.
use crate::{
    config::Target,
    http::traits::{HttpResponse, MockHttpClient},
    orchestrator::Orchestrator,
    test_helpers::create_test_config,
    workspace::traits::MockWorkspace,
};

pub const TEST_USER: &str = "alice";
pub const TEST_BRANCH: &str = "TICKET";
pub const TEST_REMOTE_URL: &str = "git@github.com:team/app.git";

/// Build an orchestrator over the given mocks with the test config.
pub fn create_orchestrator(
    workspace: MockWorkspace,
    http: MockHttpClient,
    dry_run: bool,
    force: bool,
) -> Orchestrator {
    create_orchestrator_for(Target::Production, workspace, http, dry_run, force)
}

pub fn create_orchestrator_for(
    target: Target,
    workspace: MockWorkspace,
    http: MockHttpClient,
    dry_run: bool,
    force: bool,
) -> Orchestrator {
    Orchestrator::builder()
        .config(create_test_config())
        .workspace(Box::new(workspace))
        .http(Box::new(http))
        .target(target)
        .dry_run(dry_run)
        .force(force)
        .build()
        .unwrap()
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_string(),
    }
}

/// Workspace expectations for a clean, pushed feature branch where no tag
/// exists yet.
pub fn clean_workspace(branch: &'static str) -> MockWorkspace {
    let mut workspace = MockWorkspace::new();
    workspace
        .expect_fetch()
        .withf(|prune| *prune)
        .times(1)
        .returning(|_| Ok(()));
    workspace
        .expect_current_branch_name()
        .returning(move || Ok(branch.to_string()));
    workspace
        .expect_remote_url()
        .returning(|_| Ok(TEST_REMOTE_URL.to_string()));
    workspace.expect_unpushed_commits().returning(|| Ok(0));
    workspace
}

/// HTTP mock answering the version check with the local version and the
/// notify request with `notify_body`.
pub fn passing_http(notify_body: &'static str) -> MockHttpClient {
    let mut http = MockHttpClient::new();
    http.expect_get()
        .withf(|url| url.ends_with("/version.json"))
        .times(1)
        .returning(|_| {
            Ok(response(
                200,
                &format!(r#"{{"version":"{}"}}"#, env!("CARGO_PKG_VERSION")),
            ))
        });
    http.expect_get()
        .withf(|url| url.contains("/git/notifyCommit"))
        .times(1)
        .returning(move |_| Ok(response(200, notify_body)));
    http
}
