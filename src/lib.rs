//! # Burnlink (terminal client for self-destructing secrets)
//!
//! `burnlink` talks to a one-time secret service: users log in with a one-time
//! password, create secrets with optional passphrase protection and expiry, and
//! share a link. A recipient views the secret exactly once before it is burned.
//!
//! ## Viewing lifecycle
//!
//! The [`viewer`] module owns the state machine that coordinates the passphrase
//! probe, retrieval, the burn countdown and the destruction animation before
//! returning the user to the creation route. The backend is authoritative on
//! whether a passphrase is required and on one-time consumption; the client only
//! guarantees that it never re-requests a secret after a successful reveal.
//!
//! ## Secret material
//!
//! Messages, passphrases and tokens are kept in [`secrecy::SecretString`] and
//! are never logged.

pub mod api;
pub mod cli;
pub mod session;
pub mod terminal;
pub mod viewer;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
