use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use super::error::ApiError;

/// Agent authentication: resolve the `x-api-key` header to an employee
/// before any handler runs. Missing or unknown keys short-circuit with 401
/// and no side effects; on success the resolved identity rides in the
/// request extensions.
pub async fn require_agent_key(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let api_key = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim()
        .to_string();

    if api_key.is_empty() {
        return ApiError::Unauthorized("Missing API key".to_string()).into_response();
    }

    match state.store.resolve_api_key(&api_key).await {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Ok(None) => ApiError::Unauthorized("Invalid API key".to_string()).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Operator authentication: a static bearer token from configuration. A
/// stand-in for the external operator session layer; everything behind it
/// is the dashboard's API surface.
pub async fn require_operator_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    match token {
        Some(t) if t == state.operator_token => next.run(req).await,
        _ => ApiError::Unauthorized(
            "Missing or invalid operator token. Use: Bearer <token>".to_string(),
        )
        .into_response(),
    }
}
