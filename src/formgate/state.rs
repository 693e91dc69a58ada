//! Shared, read-only application state.

use super::{client::AuthClient, render::Templates};
use std::time::Duration;

const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(4);

/// What the protected route answers when nobody is logged in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnauthenticatedResponse {
    /// The `unauthenticated` HTML page.
    #[default]
    Page,
    /// `401` with `{"detail": "Unauthorized"}`.
    Json,
}

#[derive(Clone, Debug)]
pub struct Config {
    redirect_delay: Duration,
    unauthenticated: UnauthenticatedResponse,
    cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self {
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            unauthenticated: UnauthenticatedResponse::default(),
            cors_origins: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_unauthenticated_response(mut self, response: UnauthenticatedResponse) -> Self {
        self.unauthenticated = response;
        self
    }

    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    #[must_use]
    pub fn redirect_delay(&self) -> Duration {
        self.redirect_delay
    }

    #[must_use]
    pub fn unauthenticated_response(&self) -> UnauthenticatedResponse {
        self.unauthenticated
    }

    #[must_use]
    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }
}

/// Everything a handler needs, shared behind an `Arc` extension.
#[derive(Debug)]
pub struct AppState {
    client: AuthClient,
    templates: Templates,
    config: Config,
}

impl AppState {
    /// Build the state, compiling the embedded templates.
    /// # Errors
    /// Returns an error if a template fails to parse.
    pub fn new(client: AuthClient, config: Config) -> Result<Self, minijinja::Error> {
        Ok(Self {
            client,
            templates: Templates::new()?,
            config,
        })
    }

    #[must_use]
    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    #[must_use]
    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::new();
        assert_eq!(config.redirect_delay(), Duration::from_secs(4));
        assert_eq!(
            config.unauthenticated_response(),
            UnauthenticatedResponse::Page
        );
        assert!(config.cors_origins().is_empty());
    }

    #[test]
    fn config_builders() {
        let config = Config::new()
            .with_redirect_delay(Duration::ZERO)
            .with_unauthenticated_response(UnauthenticatedResponse::Json)
            .with_cors_origins(vec!["http://localhost".to_string()]);
        assert_eq!(config.redirect_delay(), Duration::ZERO);
        assert_eq!(
            config.unauthenticated_response(),
            UnauthenticatedResponse::Json
        );
        assert_eq!(config.cors_origins(), ["http://localhost".to_string()]);
    }
}
