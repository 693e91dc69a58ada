use axum::{
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};

const HEIGHT_TRANSITION_JS: &str = include_str!("../../../static/js/height-transition.js");

/// Script that animates the content wrapper when a fragment changes its height.
pub async fn height_transition() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        HEIGHT_TRANSITION_JS,
    )
}
