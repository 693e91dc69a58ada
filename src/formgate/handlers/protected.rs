use super::principal::resolve_principal;
use crate::formgate::{
    error::Result,
    render::{RenderMode, CALC, CONTENT_BLOCK, UNAUTHENTICATED},
    state::{AppState, UnauthenticatedResponse},
};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use minijinja::context;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Blocks of the calc view sent to fragment requests.
const CALC_FRAGMENT_BLOCKS: &[&str] = &[CONTENT_BLOCK];

#[instrument(skip_all)]
pub async fn authenticated_route(
    mode: RenderMode,
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let Some(user) = resolve_principal(&headers, state.client()).await? else {
        debug!("No principal for protected route");
        return unauthenticated(&state);
    };

    let html = state
        .templates()
        .render(mode, CALC, CALC_FRAGMENT_BLOCKS, context! { user => user })?;

    Ok(Html(html).into_response())
}

fn unauthenticated(state: &AppState) -> Result<Response> {
    match state.config().unauthenticated_response() {
        UnauthenticatedResponse::Page => {
            let html = state
                .templates()
                .render_page(UNAUTHENTICATED, context! { user => () })?;
            Ok(Html(html).into_response())
        }
        UnauthenticatedResponse::Json => Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Unauthorized" })),
        )
            .into_response()),
    }
}
