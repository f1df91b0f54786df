use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::AppState;
use super::auth;
use super::handlers::{activity, employees, requests, screenshots};

/// Agents upload JPEG screenshots; leave generous headroom over axum's
/// default body limit.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Any origin may call: agents sit on arbitrary networks and the dashboard
/// is served from wherever the operator hosts it.
fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

pub fn build_api_router(state: AppState) -> Router {
    let agent_routes = Router::new()
        .route("/api/agent/activity", post(activity::log_activity))
        .route(
            "/api/agent/screenshots",
            post(screenshots::upload_screenshot),
        )
        .route("/api/agent/requests", post(requests::submit_request))
        .route(
            "/api/agent/requests/status",
            get(requests::check_request_status),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_agent_key,
        ))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state.clone());

    let operator_routes = Router::new()
        .route(
            "/api/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/api/employees/{id}",
            axum::routing::patch(employees::update_employee).delete(employees::delete_employee),
        )
        .route(
            "/api/employees/{id}/rotate-key",
            post(employees::rotate_api_key),
        )
        .route("/api/employees/{id}/activity", get(activity::list_activity))
        .route(
            "/api/employees/{id}/screenshots",
            get(screenshots::list_screenshots),
        )
        .route(
            "/api/screenshots/{id}/image",
            get(screenshots::screenshot_image),
        )
        .route("/api/requests", get(requests::list_requests))
        .route(
            "/api/requests/{id}/respond",
            post(requests::respond_to_request),
        )
        .route("/api/events", get(super::sse_events_endpoint))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_operator_token,
        ))
        .with_state(state);

    agent_routes.merge(operator_routes).layer(build_cors())
}
