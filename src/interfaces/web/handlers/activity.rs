use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::info;

use crate::core::events::ChangeEvent;
use crate::core::store::types::{EmployeeIdentity, ReportStatus};
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};

#[derive(serde::Deserialize)]
pub struct LogActivityRequest {
    app_name: Option<String>,
    status: Option<String>,
    duration_seconds: Option<i64>,
}

/// One activity sample from the agent. Appends a log row and drives the
/// presence transition in a single store call; a retried request appends a
/// second log row (no dedupe key on this path).
pub async fn log_activity(
    State(state): State<AppState>,
    Extension(agent): Extension<EmployeeIdentity>,
    Json(payload): Json<LogActivityRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let app_name = payload.app_name.as_deref().unwrap_or("");
    let status_raw = payload.status.as_deref().unwrap_or("");
    if app_name.is_empty() || status_raw.is_empty() {
        return Err(ApiError::Validation(
            "Missing required fields: app_name, status".to_string(),
        ));
    }
    let status = ReportStatus::parse(status_raw).ok_or_else(|| {
        ApiError::Validation("Status must be \"working\" or \"idle\"".to_string())
    })?;
    let duration_seconds = payload.duration_seconds.unwrap_or(0);
    if duration_seconds < 0 {
        return Err(ApiError::Validation(
            "duration_seconds must be non-negative".to_string(),
        ));
    }

    let log = state
        .store
        .log_activity(&agent.id, app_name, status, duration_seconds)
        .await?;

    let _ = state
        .events
        .send(ChangeEvent::inserted("activity_logs", log.id));
    let _ = state
        .events
        .send(ChangeEvent::updated("employees", agent.id.clone()));

    info!(
        "Activity logged for {}: {} ({})",
        agent.employee_code,
        app_name,
        status.as_str()
    );
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(serde::Deserialize)]
pub struct ListParams {
    limit: Option<i64>,
}

/// Operator view of an employee's recent samples, newest first.
pub async fn list_activity(
    Path(employee_id): Path<String>,
    Query(params): Query<ListParams>,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.store.get_employee(&employee_id).await?.is_none() {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    let logs = state.store.list_activity(&employee_id, limit).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "activity": logs }),
    ))
}
