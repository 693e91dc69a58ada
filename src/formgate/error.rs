use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failures that abort a request before a view can be chosen.
///
/// Status codes returned by the auth service are not errors here; handlers
/// turn them into fragments. These variants cover what is left: the auth
/// service could not be reached, a template failed, or a header could not be
/// built.
#[derive(Debug, Error)]
pub enum Error {
    #[error("auth service request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),
    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

impl Error {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Template(_) | Self::Header(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let status = self.status_code();
        let reason = status.canonical_reason().unwrap_or("Error");

        (status, reason).into_response()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_errors_map_to_internal_server_error() {
        let err = Error::from(minijinja::Error::new(
            minijinja::ErrorKind::TemplateNotFound,
            "missing.html",
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn header_errors_map_to_internal_server_error() {
        let result = axum::http::HeaderValue::from_str("bad\nvalue");
        assert!(result.is_err());
        if let Err(invalid) = result {
            let err = Error::from(invalid);
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
