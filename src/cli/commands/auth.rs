use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_AUTH_TIMEOUT_SECONDS: &str = "auth-timeout-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Base URL of the auth service, example: http://localhost:8000")
                .env("FORMGATE_AUTH_URL")
                .default_value("http://localhost:8000"),
        )
        .arg(
            Arg::new(ARG_AUTH_TIMEOUT_SECONDS)
                .long(ARG_AUTH_TIMEOUT_SECONDS)
                .help("Request timeout for calls to the auth service, in seconds")
                .env("FORMGATE_AUTH_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: Url,
    pub timeout_seconds: u64,
}

impl Options {
    /// Read the auth service options from validated matches.
    /// # Errors
    /// Returns an error if the auth URL is missing or not a valid absolute URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let raw = matches
            .get_one::<String>(ARG_AUTH_URL)
            .context("missing required argument: --auth-url")?;
        let url = Url::parse(raw).with_context(|| format!("Invalid auth service URL: {raw}"))?;

        Ok(Self {
            url,
            timeout_seconds: matches
                .get_one::<u64>(ARG_AUTH_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
        })
    }
}
