//! Reservoir Service Library
//!
//! HTTP handlers, response types and router assembly for the reservoir
//! readings service. This library is used by both the reservoir-service
//! binary and integration tests.

pub mod config;
pub mod handlers;
pub mod logging;
pub mod response;

use std::any::Any as PanicPayload;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    http::{header::HeaderName, HeaderValue, Method, Request},
    response::{IntoResponse, Response},
    routing::get,
    BoxError, Router,
};
use reservoir::ReadingStore;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::config::HttpServerConfig;

// Re-export commonly used types for convenience
pub use handlers::ReadingsQuery;
pub use response::{ApiError, DataItem, ErrorResponse, ReservoirResponse};

/// Header carrying the request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across handlers.
pub struct AppState {
    /// Source of daily readings.
    pub store: Arc<dyn ReadingStore>,
    /// Deadline shared by the storage calls of one request.
    pub query_timeout: Duration,
}

impl AppState {
    pub fn new<S: ReadingStore + 'static>(store: S, query_timeout: Duration) -> Self {
        Self {
            store: Arc::new(store),
            query_timeout,
        }
    }
}

/// OpenAPI documentation for the reservoir service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reservoir Readings Service",
        version = "0.1.0",
        description = "Paginated daily water level and volume readings for monitored reservoirs.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(handlers::get_reservoir_readings, handlers::health_check),
    components(schemas(ReservoirResponse, DataItem, ErrorResponse)),
    tags(
        (name = "reservoir", description = "Reservoir reading endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Path of the readings route for a configured prefix.
///
/// Surrounding slashes in `prefix` are ignored; an empty prefix mounts the
/// route at `/reservoir/:reservoir_id`.
pub fn readings_route(prefix: &str) -> String {
    match prefix.trim_matches('/') {
        "" => "/reservoir/:reservoir_id".to_string(),
        prefix => format!("/{}/reservoir/:reservoir_id", prefix),
    }
}

/// Build the application router with its middleware stack.
pub fn router(state: Arc<AppState>, http: &HttpServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(HandleErrorLayer::new(middleware_error))
        .layer(TimeoutLayer::new(http.timeout))
        .layer(cors_layer(&http.allowed_origins, request_id));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api-docs/openapi.json", get(handlers::openapi_json))
        .route(&readings_route(&http.route_prefix), get(handlers::get_reservoir_readings))
        .with_state(state)
        .layer(middleware)
}

/// Render a handler panic in the error envelope.
fn panic_response(_payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    ApiError::Internal.into_response()
}

/// Render middleware failures, such as the HTTP timeout, in the error envelope.
async fn middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        ApiError::RequestTimeout
    } else {
        tracing::error!(error = %err, "Middleware failure");
        ApiError::Internal
    }
}

fn cors_layer(allowed_origins: &[String], request_id: HeaderName) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .expose_headers([request_id]);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}
