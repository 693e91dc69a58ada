//! # Formgate
//!
//! `formgate` serves the login, signup and account pages for an external
//! authentication API. It renders server-side templates and answers
//! fragment requests either with plain HTML or with a stream of Datastar
//! server-sent events, so the browser can swap parts of the page in place.
//!
//! ## Rendering modes
//!
//! Every request is classified once as a full page request or a fragment
//! request (`datastar-request: true` or `X-Requested-With: XMLHttpRequest`).
//! Handlers pick the template block to render from that mode instead of
//! inspecting headers themselves.
//!
//! ## Auth service
//!
//! Credentials are forwarded to the auth service and never stored. The
//! session token it issues is relayed to the browser as the `auth` cookie and
//! forwarded back on logout and when resolving the current user.

pub mod cli;
pub mod formgate;

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
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
