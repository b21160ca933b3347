//! Route definitions for the Study Records API
//!
//! This module organizes all API routes and applies middleware.

use crate::config::CorsConfig;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    error_handling::HandleErrorLayer,
    http::{HeaderName, HeaderValue, Method},
    BoxError, Router,
};
use std::time::Duration;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

mod auth;
mod health;
mod users;


pub use auth::auth_routes;
pub use health::health_routes;
pub use users::user_routes;

/// Upper bound on handling a single request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors);

    let routes = Router::new()
        .merge(health::health_routes())
        .merge(auth::auth_routes())
        .merge(users::user_routes(state.clone()));

    // Apply middleware layers
    with_request_timeout(routes, REQUEST_TIMEOUT)
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bound every request by `timeout`, answering 408 with the API error body
fn with_request_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .timeout(timeout),
    )
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(anyhow::anyhow!("middleware error: {}", err))
    }
}

/// Build the CORS layer from the configured allow-lists
///
/// Entries were checked by `AppConfig::validate`; anything unparsable is
/// skipped here. An origin of `*` allows any origin.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allowed_origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| Method::from_bytes(m.trim().as_bytes()).ok())
        .collect();

    let headers: Vec<HeaderName> = config
        .allowed_headers
        .iter()
        .filter_map(|h| HeaderName::from_bytes(h.trim().as_bytes()).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
}
