//! Route handlers and the helpers they share.
//!
//! Handlers pull `Arc<AppState>` from an extension, resolve a `RenderMode`
//! once, and answer with HTML or a Datastar stream.

pub mod assets;
pub mod health;
pub mod login;
pub mod logout;
pub mod pages;
pub mod principal;
pub mod protected;
pub mod proxy;
pub mod signup;

use super::{
    datastar::{DatastarEvent, DatastarStream},
    error::Result,
    render::{FAILED_BLOCK, SNIPPETS},
    state::AppState,
};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use minijinja::context;

/// Name of the cookie carrying the auth service session token.
pub const AUTH_COOKIE: &str = "auth";

/// Where the browser lands after a successful login.
pub const AUTHENTICATED_ROUTE: &str = "/authenticated-route";

/// Element id and heading of a `failed` fragment.
#[derive(Clone, Copy, Debug)]
pub struct FailureTarget {
    pub id: &'static str,
    pub title: &'static str,
}

pub const LOGIN_FAILURE: FailureTarget = FailureTarget {
    id: "loginerrordiv",
    title: "Login failed",
};

pub const SIGNUP_FAILURE: FailureTarget = FailureTarget {
    id: "signuperrordiv",
    title: "Sign Up failed",
};

/// Stream a single `failed` fragment into `target`.
pub(crate) fn failure_stream(
    state: &AppState,
    target: FailureTarget,
    message: &str,
) -> Result<DatastarStream> {
    let html = state.templates().render_block(
        SNIPPETS,
        FAILED_BLOCK,
        context! {
            target_id => target.id,
            title => target.title,
            message => message,
        },
    )?;

    Ok(DatastarStream::once(DatastarEvent::merge_fragments(html)))
}

/// `Set-Cookie` value storing the session token.
pub(crate) fn session_cookie(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!("{AUTH_COOKIE}={token}; HttpOnly; Secure; Path=/"))
}

/// `Set-Cookie` value that removes the session token.
pub(crate) fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("auth=; HttpOnly; Secure; Path=/; Max-Age=0")
}

/// Session token from the request's `Cookie` headers, if any.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.trim() == AUTH_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_secure() -> Result<(), InvalidHeaderValue> {
        let cookie = session_cookie("tok-123")?;
        assert_eq!(cookie, "auth=tok-123; HttpOnly; Secure; Path=/");
        Ok(())
    }

    #[test]
    fn session_cookie_rejects_header_breaking_tokens() {
        assert!(session_cookie("tok\r\nSet-Cookie: evil=1").is_err());
    }

    #[test]
    fn extract_session_token_finds_auth_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth=tok-123; lang=en"),
        );
        assert_eq!(extract_session_token(&headers), Some("tok-123".to_string()));
    }

    #[test]
    fn extract_session_token_unquotes_value() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth=\"tok-123\""));
        assert_eq!(extract_session_token(&headers), Some("tok-123".to_string()));

        headers.insert(COOKIE, HeaderValue::from_static("auth=\"\""));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn extract_session_token_ignores_other_and_empty_cookies() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("authz=nope; auth="));
        assert_eq!(extract_session_token(&headers), None);
    }
}
