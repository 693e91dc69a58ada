//! Map validated CLI arguments to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, view, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if an argument is present but cannot be interpreted.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let auth_opts = auth::Options::parse(matches)?;
    let view_opts = view::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        auth_url: auth_opts.url,
        auth_timeout_seconds: auth_opts.timeout_seconds,
        redirect_delay_ms: view_opts.redirect_delay_ms,
        unauthenticated: view_opts.unauthenticated,
        cors_origins: view_opts.cors_origins,
    }))
}
