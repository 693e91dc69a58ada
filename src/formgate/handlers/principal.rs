//! Resolve the logged-in user from the `auth` cookie.

use super::extract_session_token;
use crate::formgate::client::{AuthClient, Principal};
use axum::http::HeaderMap;

/// Look up the user owning the request's session token.
///
/// No cookie means no principal; the auth service is not called.
/// # Errors
/// Returns an error if the auth service cannot be reached.
pub async fn resolve_principal(
    headers: &HeaderMap,
    client: &AuthClient,
) -> reqwest::Result<Option<Principal>> {
    match extract_session_token(headers) {
        Some(token) => client.current_user(&token).await,
        None => Ok(None),
    }
}
