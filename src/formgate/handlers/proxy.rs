//! Pass-through for the auth service's own `/auth/*` and `/users/*` routes.

use crate::formgate::{error::Result, state::AppState};
use axum::{
    body::Bytes,
    extract::Extension,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        uri::PathAndQuery,
        HeaderMap, HeaderName, Method, Uri,
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument};

const FORWARDED_REQUEST_HEADERS: [HeaderName; 4] = [ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE];
const RELAYED_RESPONSE_HEADERS: [HeaderName; 3] = [CONTENT_TYPE, LOCATION, SET_COOKIE];

fn copy_headers(source: &HeaderMap, names: &[HeaderName]) -> HeaderMap {
    let mut copied = HeaderMap::new();
    for name in names {
        for value in source.get_all(name) {
            copied.append(name.clone(), value.clone());
        }
    }
    copied
}

#[instrument(skip_all, fields(http.path = %uri.path()))]
pub async fn forward(
    Extension(state): Extension<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let path_and_query = uri
        .path_and_query()
        .map_or_else(|| uri.path(), PathAndQuery::as_str);

    let upstream = state
        .client()
        .forward(
            method,
            path_and_query,
            copy_headers(&headers, &FORWARDED_REQUEST_HEADERS),
            body,
        )
        .await?;

    let status = upstream.status();
    debug!("Forwarded request answered with {}", status);

    let response_headers = copy_headers(upstream.headers(), &RELAYED_RESPONSE_HEADERS);
    let body = upstream.bytes().await?;

    Ok((status, response_headers, body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn copy_headers_keeps_listed_names_only() {
        let mut source = HeaderMap::new();
        source.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        source.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        source.insert("x-internal", HeaderValue::from_static("secret"));

        let copied = copy_headers(&source, &RELAYED_RESPONSE_HEADERS);
        assert_eq!(copied.get_all(SET_COOKIE).iter().count(), 2);
        assert!(copied.get("x-internal").is_none());
    }
}
