pub mod client;
pub mod datastar;
pub mod error;
pub mod handlers;
pub mod render;
pub mod state;

pub use self::client::{AuthClient, Principal};
pub use self::state::{AppState, Config, UnauthenticatedResponse};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Method, Request},
    routing::{any, get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, warn, Span};
use ulid::Ulid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// All application routes, without the transport layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/health", get(handlers::health::health))
        .route("/login_form", get(handlers::pages::login_form))
        .route("/signup_form", get(handlers::pages::signup_form))
        .route(
            "/forgotpassword_form",
            get(handlers::pages::forgotpassword_form),
        )
        .route("/muster_form", get(handlers::pages::muster_form))
        .route("/login_validate", post(handlers::login::login_validate))
        .route("/signup_validate", post(handlers::signup::signup_validate))
        .route("/logout", post(handlers::logout::logout))
        .route(
            "/authenticated-route",
            get(handlers::protected::authenticated_route),
        )
        .route(
            "/static/js/height-transition.js",
            get(handlers::assets::height_transition),
        )
        .route("/auth/*rest", any(handlers::proxy::forward))
        .route("/users/*rest", any(handlers::proxy::forward))
        .layer(Extension(state))
}

/// The routes wrapped in request-id, tracing and CORS layers.
///
/// A request without `x-request-id` gets a fresh ULID; the id is echoed on
/// the response either way.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config().cors_origins());

    router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static(REQUEST_ID_HEADER),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                REQUEST_ID_HEADER,
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    )
}

/// Start the server
/// # Errors
/// Return error if the templates fail to load or the listener cannot be bound
pub async fn new(port: u16, client: AuthClient, config: Config) -> Result<()> {
    let state = Arc::new(AppState::new(client, config).context("Failed to load templates")?);

    info!("Using auth service at {}", state.client().base_url());

    let app = app(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Credentialed CORS for the configured origins; invalid entries are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Ignoring invalid CORS origin {}: {}", origin, err);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            HeaderName::from_static("datastar-request"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_layer_skips_invalid_origins() {
        // Construction must not panic on bad input.
        let _layer = cors_layer(&[
            "http://localhost:8000".to_string(),
            "bad\norigin".to_string(),
        ]);
    }
}
