use super::{failure_stream, session_cookie, AUTHENTICATED_ROUTE, LOGIN_FAILURE};
use crate::formgate::{
    client::LoginOutcome,
    datastar::{DatastarEvent, DatastarStream},
    error::Result,
    render::{LOGIN_SUCCESS_BLOCK, SNIPPETS},
    state::AppState,
};
use axum::{
    extract::{Extension, Form},
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
};
use minijinja::context;
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    email: String,
    password: SecretString,
}

/// Forward the credentials to the auth service and stream the result.
///
/// On success the stream shows the success fragment, waits for the
/// configured delay and redirects to the protected route; the session token
/// travels in the `auth` cookie.
#[instrument(skip_all)]
pub async fn login_validate(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    debug!("Login attempt for {}", form.email);

    let outcome = state.client().login(&form.email, &form.password).await?;

    match outcome {
        LoginOutcome::Success { token } => {
            info!("Login succeeded");

            let html = state
                .templates()
                .render_block(SNIPPETS, LOGIN_SUCCESS_BLOCK, context! {})?;
            let stream = DatastarStream::once(DatastarEvent::merge_fragments(html).with_view_transition())
                .event_after(
                    state.config().redirect_delay(),
                    DatastarEvent::redirect(AUTHENTICATED_ROUTE),
                );

            Ok(([(SET_COOKIE, session_cookie(&token)?)], stream).into_response())
        }
        LoginOutcome::InvalidCredentials => {
            debug!("Login rejected: invalid credentials");
            Ok(failure_stream(&state, LOGIN_FAILURE, "Invalid credentials")?.into_response())
        }
        LoginOutcome::Rejected(status) => {
            debug!("Login rejected with status {}", status);
            let message = format!("Login failed with status code: {}", status.as_u16());
            Ok(failure_stream(&state, LOGIN_FAILURE, &message)?.into_response())
        }
    }
}
