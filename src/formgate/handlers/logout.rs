use super::{clear_session_cookie, extract_session_token};
use crate::formgate::{
    client::LogoutOutcome,
    error::Result,
    render::{SIGNUP_SUCCESS_BLOCK, SNIPPETS},
    state::AppState,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const UNKNOWN_RETURN_CODE: &str = "Unknown return Code!!";

/// End the session upstream. The browser cookie is cleared only once the
/// auth service confirms.
#[instrument(skip_all)]
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let token = extract_session_token(&headers);

    match state.client().logout(token.as_deref()).await? {
        LogoutOutcome::LoggedOut => {
            info!("Logout succeeded");

            let html = state
                .templates()
                .render_block(SNIPPETS, SIGNUP_SUCCESS_BLOCK, context! {})?;
            Ok((
                StatusCode::CREATED,
                [(SET_COOKIE, clear_session_cookie())],
                Html(html),
            )
                .into_response())
        }
        LogoutOutcome::Rejected(status) => {
            warn!("Unrecognized upstream status from logout: {}", status);
            Ok(UNKNOWN_RETURN_CODE.into_response())
        }
    }
}
