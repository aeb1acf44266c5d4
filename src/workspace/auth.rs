//! Credential callbacks for fetch, ls-remote and push.
use git2::{Cred, CredentialType, RemoteCallbacks};
use log::*;

/// libgit2 keeps asking for credentials until one works, so stop after a
/// few rounds instead of looping on a broken agent.
const MAX_CREDENTIAL_ATTEMPTS: usize = 4;

/// Create remote callbacks that authenticate the way the git CLI would:
/// ssh agent for ssh remotes, the configured credential helper for https.
pub fn remote_callbacks<'r>(config: git2::Config) -> RemoteCallbacks<'r> {
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "no valid credentials found for {url}"
            )));
        }

        let user = username.unwrap_or("git");

        if allowed.contains(CredentialType::SSH_KEY) {
            debug!("authenticating to {url} with ssh agent as {user}");
            return Cred::ssh_key_from_agent(user);
        }

        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            debug!("authenticating to {url} with credential helper");
            return Cred::credential_helper(&config, url, username);
        }

        if allowed.contains(CredentialType::USERNAME) {
            return Cred::username(user);
        }

        Cred::default()
    });
    callbacks
}
