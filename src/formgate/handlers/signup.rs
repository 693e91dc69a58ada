use super::{failure_stream, SIGNUP_FAILURE};
use crate::formgate::{
    client::RegisterOutcome,
    datastar::{DatastarEvent, DatastarStream},
    error::Result,
    render::{SIGNUP_SUCCESS_BLOCK, SNIPPETS},
    state::AppState,
};
use axum::{
    extract::{Extension, Form},
    response::{IntoResponse, Response},
};
use minijinja::context;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const PASSWORD_MISMATCH: &str = "Password Repeat missmatch";
pub const EMAIL_IN_USE: &str = "Email address already in use";
pub const INVALID_PASSWORD: &str = "Invalid Password";
pub const VALIDATION_ERROR: &str = "Validation Error";

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    email: String,
    password: SecretString,
    passwordrepeat: SecretString,
}

/// Check the repeated password locally, then register the account with the
/// auth service. Every branch answers with a Datastar stream.
#[instrument(skip_all)]
pub async fn signup_validate(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    debug!("Signup attempt for {}", form.email);

    if form.password.expose_secret() != form.passwordrepeat.expose_secret() {
        debug!("Signup rejected: password repeat mismatch");
        return Ok(failure_stream(&state, SIGNUP_FAILURE, PASSWORD_MISMATCH)?.into_response());
    }

    let message = match state.client().register(&form.email, &form.password).await? {
        RegisterOutcome::Created => {
            info!("Signup succeeded");

            let html = state
                .templates()
                .render_block(SNIPPETS, SIGNUP_SUCCESS_BLOCK, context! {})?;
            return Ok(
                DatastarStream::once(DatastarEvent::merge_fragments(html).with_view_transition())
                    .into_response(),
            );
        }
        RegisterOutcome::AlreadyExists => EMAIL_IN_USE.to_string(),
        RegisterOutcome::InvalidPassword => INVALID_PASSWORD.to_string(),
        RegisterOutcome::ValidationError => VALIDATION_ERROR.to_string(),
        RegisterOutcome::Unrecognized { status, code } => {
            warn!(
                "Unrecognized upstream status from registration: {} (code: {})",
                status,
                code.as_deref().unwrap_or("none")
            );
            format!("Sign Up failed with status code: {}", status.as_u16())
        }
    };

    Ok(failure_stream(&state, SIGNUP_FAILURE, &message)?.into_response())
}
