//! HTTP client for the external auth service.
//!
//! Every call is a single attempt. Status codes the views care about are
//! mapped to outcome enums; transport failures bubble up as `reqwest::Error`.

use crate::APP_USER_AGENT;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, COOKIE, SET_COOKIE},
    HeaderMap, Method, StatusCode,
};
use reqwest::{redirect::Policy, Body, Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::handlers::AUTH_COOKIE;

const LOGIN_PATH: &str = "/auth/jwt/login";
const LOGOUT_PATH: &str = "/auth/jwt/logout";
const REGISTER_PATH: &str = "/auth/register";
const CURRENT_USER_PATH: &str = "/users/me";

const REGISTER_USER_ALREADY_EXISTS: &str = "REGISTER_USER_ALREADY_EXISTS";
const REGISTER_INVALID_PASSWORD: &str = "REGISTER_INVALID_PASSWORD";

/// Result of `POST /auth/jwt/login`.
#[derive(Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// 200 or 204. `token` is empty when the auth service sent none.
    Success { token: String },
    /// 400: bad credentials or inactive user.
    InvalidCredentials,
    Rejected(StatusCode),
}

/// Result of `POST /auth/register`.
#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    AlreadyExists,
    InvalidPassword,
    /// 422: the request body failed validation upstream.
    ValidationError,
    /// Any status or error code the views have no message for.
    Unrecognized {
        status: StatusCode,
        code: Option<String>,
    },
}

/// Result of `POST /auth/jwt/logout`.
#[derive(Debug, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    Rejected(StatusCode),
}

/// The user record returned by `GET /users/me`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Clone, Debug)]
pub struct AuthClient {
    client: Client,
    base_url: Url,
}

impl AuthClient {
    /// Build a client for the auth service at `base_url`.
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path_and_query
        )
    }

    /// Exchange credentials for a session token (OAuth2 password grant).
    /// # Errors
    /// Returns an error if the auth service cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> reqwest::Result<LoginOutcome> {
        let form = [
            ("grant_type", "password"),
            ("username", email),
            ("password", password.expose_secret()),
            ("scope", ""),
            ("client_id", ""),
            ("client_secret", ""),
        ];

        let response = self
            .client
            .post(self.endpoint(LOGIN_PATH))
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        debug!("login status: {}", status);

        Ok(match status {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                let token = session_token(response).await;
                if token.is_empty() {
                    warn!("Auth service accepted the login but returned no token");
                }
                LoginOutcome::Success { token }
            }
            StatusCode::BAD_REQUEST => LoginOutcome::InvalidCredentials,
            other => LoginOutcome::Rejected(other),
        })
    }

    /// Create a user account.
    /// # Errors
    /// Returns an error if the auth service cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> reqwest::Result<RegisterOutcome> {
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
            "is_active": true,
            "is_superuser": false,
            "is_verified": false,
        });

        let response = self
            .client
            .post(self.endpoint(REGISTER_PATH))
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!("register status: {}", status);

        Ok(match status {
            StatusCode::CREATED => RegisterOutcome::Created,
            StatusCode::BAD_REQUEST => {
                let code = response
                    .json::<Value>()
                    .await
                    .ok()
                    .as_ref()
                    .and_then(error_code);
                match code.as_deref() {
                    Some(REGISTER_USER_ALREADY_EXISTS) => RegisterOutcome::AlreadyExists,
                    Some(REGISTER_INVALID_PASSWORD) => RegisterOutcome::InvalidPassword,
                    _ => RegisterOutcome::Unrecognized { status, code },
                }
            }
            StatusCode::UNPROCESSABLE_ENTITY => RegisterOutcome::ValidationError,
            _ => RegisterOutcome::Unrecognized { status, code: None },
        })
    }

    /// End the session identified by `token`.
    /// # Errors
    /// Returns an error if the auth service cannot be reached.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: Option<&str>) -> reqwest::Result<LogoutOutcome> {
        let request = self
            .client
            .post(self.endpoint(LOGOUT_PATH))
            .header(ACCEPT, "application/json")
            .json(&json!({}));

        let response = with_session(request, token).send().await?;

        let status = response.status();
        debug!("logout status: {}", status);

        Ok(if status == StatusCode::CREATED {
            LogoutOutcome::LoggedOut
        } else {
            LogoutOutcome::Rejected(status)
        })
    }

    /// Resolve the user that owns `token`.
    ///
    /// Returns `Ok(None)` when the auth service does not recognise the
    /// session.
    /// # Errors
    /// Returns an error if the auth service cannot be reached or sends an
    /// unreadable user record.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: &str) -> reqwest::Result<Option<Principal>> {
        let request = self
            .client
            .get(self.endpoint(CURRENT_USER_PATH))
            .header(ACCEPT, "application/json");

        let response = with_session(request, Some(token)).send().await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<Principal>().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            other => {
                warn!("Unexpected status resolving current user: {}", other);
                Ok(None)
            }
        }
    }

    /// Relay a request to the auth service unchanged.
    /// # Errors
    /// Returns an error if the auth service cannot be reached.
    #[instrument(skip(self, headers, body))]
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: impl Into<Body>,
    ) -> reqwest::Result<Response> {
        self.client
            .request(method, self.endpoint(path_and_query))
            .headers(headers)
            .body(body)
            .send()
            .await
    }
}

fn with_session(request: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => request
            .header(COOKIE, format!("{AUTH_COOKIE}={token}"))
            .header(AUTHORIZATION, format!("Bearer {token}")),
        None => request,
    }
}

/// Token from the `auth` cookie the service sets, or from a bearer
/// `access_token` in the JSON body.
async fn session_token(response: Response) -> String {
    let from_cookie = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(cookie_value);

    if let Some(token) = from_cookie {
        return token;
    }

    response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("access_token")
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_default()
}

fn cookie_value(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    (name.trim() == AUTH_COOKIE).then(|| value.trim().trim_matches('"').to_string())
}

/// The auth service reports `{"detail": "CODE"}` or
/// `{"detail": {"code": "CODE", "reason": "..."}}`.
fn error_code(body: &Value) -> Option<String> {
    let detail = body.get("detail")?;
    detail
        .as_str()
        .or_else(|| detail.get("code").and_then(Value::as_str))
        .map(ToString::to_string)
}
