//! Landing page and the static forms.

use crate::formgate::{
    datastar::{DatastarEvent, DatastarStream},
    error::Result,
    render::{RenderMode, CONTENT_BLOCK, FORGOT_PASSWORD, INDEX, LOGIN, MUSTER, SIGNUP},
    state::AppState,
};
use axum::{
    extract::Extension,
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use std::sync::Arc;

/// How a form answers a fragment request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentDelivery {
    /// The `content` block as a plain HTML body.
    Html,
    /// The `content` block merged through a Datastar event, with a view
    /// transition. Non-Datastar fragment requests still get `Html`.
    Stream,
}

fn form_view(
    state: &AppState,
    mode: RenderMode,
    template: &str,
    delivery: FragmentDelivery,
) -> Result<Response> {
    let html = state
        .templates()
        .render(mode, template, &[CONTENT_BLOCK], context! {})?;

    Ok(match delivery {
        FragmentDelivery::Stream if mode.accepts_stream() => {
            DatastarStream::once(DatastarEvent::merge_fragments(html).with_view_transition())
                .into_response()
        }
        _ => Html(html).into_response(),
    })
}

pub async fn index(Extension(state): Extension<Arc<AppState>>) -> Result<Html<String>> {
    Ok(Html(state.templates().render_page(INDEX, context! {})?))
}

pub async fn login_form(
    mode: RenderMode,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response> {
    form_view(&state, mode, LOGIN, FragmentDelivery::Stream)
}

pub async fn signup_form(
    mode: RenderMode,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response> {
    form_view(&state, mode, SIGNUP, FragmentDelivery::Stream)
}

pub async fn forgotpassword_form(
    mode: RenderMode,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response> {
    form_view(&state, mode, FORGOT_PASSWORD, FragmentDelivery::Html)
}

pub async fn muster_form(
    mode: RenderMode,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response> {
    form_view(&state, mode, MUSTER, FragmentDelivery::Html)
}
