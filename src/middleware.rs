use axum::{body::Body, http::Request, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Wraps the router with request tracing and a request timeout.
/// CORS headers are written by the envelope responder, so no CORS layer here.
pub fn apply_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            // Request/response logging with a per-request correlation id
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "http_request",
                            request_id = %Uuid::new_v4(),
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    })
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(TimeoutLayer::new(request_timeout)),
    )
}

/// Initialize structured logging with JSON format and correlation IDs
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    // Create environment filter for log levels
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Initialize tracing subscriber with JSON formatting
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
        )
        .try_init()?;

    tracing::info!("Structured logging initialized with JSON format");
    Ok(())
}
