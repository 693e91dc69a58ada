use crate::formgate::UnauthenticatedResponse;
use anyhow::{anyhow, Result};
use clap::{builder::PossibleValuesParser, Arg, ArgAction, ArgMatches, Command};

pub const ARG_REDIRECT_DELAY_MS: &str = "redirect-delay-ms";
pub const ARG_UNAUTHENTICATED_RESPONSE: &str = "unauthenticated-response";
pub const ARG_CORS_ORIGIN: &str = "cors-origin";

const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost",
    "http://localhost:8000",
    "http://127.0.0.1:8000",
];

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_REDIRECT_DELAY_MS)
                .long(ARG_REDIRECT_DELAY_MS)
                .help("Pause between the login success fragment and the redirect, in milliseconds")
                .env("FORMGATE_REDIRECT_DELAY_MS")
                .default_value("4000")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_UNAUTHENTICATED_RESPONSE)
                .long(ARG_UNAUTHENTICATED_RESPONSE)
                .help("What the protected route returns without a session: an HTML page or a JSON message")
                .env("FORMGATE_UNAUTHENTICATED_RESPONSE")
                .default_value("page")
                .value_parser(PossibleValuesParser::new(["page", "json"])),
        )
        .arg(
            Arg::new(ARG_CORS_ORIGIN)
                .long(ARG_CORS_ORIGIN)
                .help("Allowed CORS origin, may be repeated")
                .env("FORMGATE_CORS_ORIGINS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .default_values(DEFAULT_CORS_ORIGINS),
        )
}

#[derive(Debug)]
pub struct Options {
    pub redirect_delay_ms: u64,
    pub unauthenticated: UnauthenticatedResponse,
    pub cors_origins: Vec<String>,
}

impl Options {
    /// Read the view options from validated matches.
    /// # Errors
    /// Returns an error if the unauthenticated response mode is unknown.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let unauthenticated = match matches
            .get_one::<String>(ARG_UNAUTHENTICATED_RESPONSE)
            .map(String::as_str)
        {
            Some("json") => UnauthenticatedResponse::Json,
            Some("page") | None => UnauthenticatedResponse::Page,
            Some(other) => return Err(anyhow!("unknown unauthenticated response: {other}")),
        };

        Ok(Self {
            redirect_delay_ms: matches
                .get_one::<u64>(ARG_REDIRECT_DELAY_MS)
                .copied()
                .unwrap_or(4000),
            unauthenticated,
            cors_origins: matches
                .get_many::<String>(ARG_CORS_ORIGIN)
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        })
    }
}
