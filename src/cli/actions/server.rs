use crate::formgate::{self, AuthClient, Config, UnauthenticatedResponse};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub auth_url: Url,
    pub auth_timeout_seconds: u64,
    pub redirect_delay_ms: u64,
    pub unauthenticated: UnauthenticatedResponse,
    pub cors_origins: Vec<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the auth client or templates cannot be built, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let client = AuthClient::new(
        args.auth_url,
        Duration::from_secs(args.auth_timeout_seconds),
    )
    .context("Failed to build auth service client")?;

    let config = Config::new()
        .with_redirect_delay(Duration::from_millis(args.redirect_delay_ms))
        .with_unauthenticated_response(args.unauthenticated)
        .with_cors_origins(args.cors_origins);

    formgate::new(args.port, client, config).await
}
