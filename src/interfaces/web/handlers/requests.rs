use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::info;

use crate::core::events::ChangeEvent;
use crate::core::store::RespondOutcome;
use crate::core::store::types::{EmployeeIdentity, RequestStatus, RequestType};
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};

#[derive(serde::Deserialize)]
pub struct SubmitRequestBody {
    request_type: Option<String>,
}

/// Agent asks permission to close or uninstall itself. Idempotent while a
/// request for the same type is still pending: the caller gets the existing
/// id back instead of a second row.
pub async fn submit_request(
    State(state): State<AppState>,
    Extension(agent): Extension<EmployeeIdentity>,
    Json(payload): Json<SubmitRequestBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let request_type = payload
        .request_type
        .as_deref()
        .and_then(RequestType::parse)
        .ok_or_else(|| {
            ApiError::Validation(
                "Invalid request type. Must be \"close\" or \"uninstall\"".to_string(),
            )
        })?;

    let (request_id, already_pending) =
        state.store.submit_request(&agent.id, request_type).await?;

    let message = if already_pending {
        "Request already pending"
    } else {
        let _ = state
            .events
            .send(ChangeEvent::inserted("agent_requests", request_id.clone()));
        info!(
            "Agent request created: {} for employee {}",
            request_type.as_str(),
            agent.name
        );
        "Request submitted. Waiting for operator approval."
    };

    Ok(Json(serde_json::json!({
        "request_id": request_id,
        "status": "pending",
        "message": message,
    })))
}

#[derive(serde::Deserialize)]
pub struct CheckStatusParams {
    request_id: Option<String>,
}

/// Agent polls its own request. A request id owned by another employee is
/// reported as not found, never as someone else's status.
pub async fn check_request_status(
    State(state): State<AppState>,
    Extension(agent): Extension<EmployeeIdentity>,
    Query(params): Query<CheckStatusParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let request_id = params
        .request_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing request_id parameter".to_string()))?;

    let request = state
        .store
        .get_request_for_employee(&request_id, &agent.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "request_id": request.id,
        "status": request.status,
        "reason": request.reason,
        "responded_at": request.responded_at,
    })))
}

#[derive(serde::Deserialize)]
pub struct RespondBody {
    status: Option<String>,
    reason: Option<String>,
}

/// Operator decision. The write is conditioned on the row still being
/// pending; responding to an already-decided request is a conflict and
/// leaves the original decision in place.
pub async fn respond_to_request(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<RespondBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let decision = payload
        .status
        .as_deref()
        .and_then(RequestStatus::parse)
        .filter(|s| *s != RequestStatus::Pending)
        .ok_or_else(|| {
            ApiError::Validation("Status must be \"approved\" or \"denied\"".to_string())
        })?;

    let outcome = state
        .store
        .respond_to_request(&request_id, decision, payload.reason.as_deref())
        .await?;

    match outcome {
        RespondOutcome::Updated => {
            let _ = state
                .events
                .send(ChangeEvent::updated("agent_requests", request_id.clone()));
            info!("Agent request {} {}", request_id, decision.as_str());
            Ok(Json(serde_json::json!({ "success": true })))
        }
        RespondOutcome::NotPending => Err(ApiError::Conflict(
            "Request has already been responded to".to_string(),
        )),
        RespondOutcome::NotFound => Err(ApiError::NotFound("Request not found".to_string())),
    }
}

/// Full request history plus the live pending count for the review badge.
pub async fn list_requests(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let requests = state.store.list_requests().await?;
    let pending_count = state.store.pending_request_count().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "requests": requests,
        "pending_count": pending_count,
    })))
}
