use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use crate::core::events::ChangeEvent;
use crate::core::store::valid_employee_code;
use crate::core::store::types::PresenceStatus;
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};

pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let employees = state.store.list_employees().await?;
    Ok(Json(
        serde_json::json!({ "success": true, "employees": employees }),
    ))
}

#[derive(serde::Deserialize)]
pub struct CreateEmployeeRequest {
    name: Option<String>,
    employee_code: Option<String>,
    device_name: Option<String>,
}

/// Roster entry creation. The response carries the generated API key; it is
/// readable later from the roster, the employee record being the
/// credential's home.
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let name = payload.name.as_deref().unwrap_or("").trim();
    let code = payload.employee_code.as_deref().unwrap_or("").trim();
    if name.is_empty() || code.is_empty() {
        return Err(ApiError::Validation(
            "Missing required fields: name, employee_code".to_string(),
        ));
    }
    if !valid_employee_code(code) {
        return Err(ApiError::Validation(
            "employee_code must contain only alphanumeric characters, hyphens, and underscores"
                .to_string(),
        ));
    }
    if state.store.get_employee_by_code(code).await?.is_some() {
        return Err(ApiError::Conflict(
            "employee_code is already in use".to_string(),
        ));
    }

    let employee = state
        .store
        .create_employee(name, code, payload.device_name.as_deref())
        .await?;
    let _ = state
        .events
        .send(ChangeEvent::inserted("employees", employee.id.clone()));
    info!("Employee created: {} ({})", employee.name, code);

    Ok(Json(serde_json::json!({
        "success": true,
        "employee": employee,
        "message": "Employee created. Configure the agent with the api_key shown.",
    })))
}

#[derive(serde::Deserialize)]
pub struct UpdateEmployeeRequest {
    name: Option<String>,
    device_name: Option<String>,
    status: Option<String>,
}

/// Explicit operator edit: the one path besides ingestion allowed to touch
/// presence.
pub async fn update_employee(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let status = match payload.status.as_deref() {
        Some(raw) => Some(PresenceStatus::parse(raw).ok_or_else(|| {
            ApiError::Validation(
                "Status must be \"online\", \"idle\" or \"offline\"".to_string(),
            )
        })?),
        None => None,
    };

    let updated = state
        .store
        .update_employee(
            &id,
            payload.name.as_deref(),
            payload.device_name.as_deref(),
            status,
        )
        .await?;
    if !updated {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }
    let _ = state.events.send(ChangeEvent::updated("employees", id));
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn delete_employee(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = state.store.delete_employee(&id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }
    let _ = state.events.send(ChangeEvent::deleted("employees", id));
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Invalidate the current API key and issue a fresh one.
pub async fn rotate_api_key(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let api_key = state
        .store
        .rotate_api_key(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;
    let _ = state
        .events
        .send(ChangeEvent::updated("employees", id.clone()));
    info!("API key rotated for employee {}", id);
    Ok(Json(
        serde_json::json!({ "success": true, "api_key": api_key }),
    ))
}
