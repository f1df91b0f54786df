use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
};
use tracing::{error, info};

use crate::core::events::ChangeEvent;
use crate::core::store::types::EmployeeIdentity;
use crate::interfaces::web::AppState;
use crate::interfaces::web::error::{ApiError, ApiResult};

/// Screenshot upload: multipart with a single `screenshot` file field. The
/// blob lands on disk first, then the record row; a record failure after a
/// successful blob write is surfaced as a store error and the orphaned blob
/// is logged, not rolled back.
pub async fn upload_screenshot(
    State(state): State<AppState>,
    Extension(agent): Extension<EmployeeIdentity>,
    mut multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
    let mut file: Option<(Option<String>, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("screenshot") {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?;
            file = Some((file_name, content_type, data.to_vec()));
            break;
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| ApiError::Validation("No screenshot file provided".to_string()))?;
    if !content_type.starts_with("image/") {
        return Err(ApiError::Validation("File must be an image".to_string()));
    }

    let path = state
        .blobs
        .store_screenshot(&agent.employee_code, &data, file_name.as_deref())
        .await
        .map_err(|e| ApiError::Store(format!("{:#}", e)))?;

    let shot = match state.store.insert_screenshot(&agent.id, &path).await {
        Ok(shot) => shot,
        Err(e) => {
            error!("screenshot record insert failed, orphaned blob at {}", path);
            return Err(ApiError::from(e));
        }
    };
    state.store.touch_last_seen(&agent.id).await?;

    let _ = state
        .events
        .send(ChangeEvent::inserted("screenshots", shot.id));
    let _ = state
        .events
        .send(ChangeEvent::updated("employees", agent.id.clone()));

    info!("Screenshot stored for {}: {}", agent.employee_code, path);
    Ok(Json(serde_json::json!({ "success": true, "path": path })))
}

#[derive(serde::Deserialize)]
pub struct ListParams {
    limit: Option<i64>,
}

pub async fn list_screenshots(
    Path(employee_id): Path<String>,
    Query(params): Query<ListParams>,
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.store.get_employee(&employee_id).await?.is_none() {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let shots = state.store.list_screenshots(&employee_id, limit).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "screenshots": shots }),
    ))
}

/// Serve the raw image bytes for a stored screenshot, content type guessed
/// from the path.
pub async fn screenshot_image(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let shot = state
        .store
        .get_screenshot(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Screenshot not found".to_string()))?;
    let bytes = state
        .blobs
        .read(&shot.image_path)
        .await
        .map_err(|_| ApiError::NotFound("Screenshot not found".to_string()))?;
    let mime = mime_guess::from_path(&shot.image_path).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes))
}
