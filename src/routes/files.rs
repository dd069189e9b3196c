//! File Routes
//!
//! Endpoints:
//! - POST /v1/files/upload - Upload a file (multipart), deduplicated by content
//! - DELETE /v1/files/cache/:digest - Drop the cached reference for a digest

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::upload::{UploadRequest, UploadResult, DEFAULT_CONTENT_TYPE, DEFAULT_PROJECT_ID};

/// Create file routes
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/cache/:digest", delete(invalidate_cache))
}

/// The `file` part of an upload form
struct FilePart {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Upload a file, reusing the remote reference of identical content
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>> {
    let mut file: Option<FilePart> = None;
    let mut project_id: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        AppError::status(e.status(), e.body_text())
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let part_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::status(e.status(), e.body_text()))?;

                file = Some(FilePart {
                    file_name,
                    content_type: part_type,
                    data,
                });
            }
            "project_id" => {
                project_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::status(e.status(), e.body_text()))?,
                );
            }
            "content_type" => {
                content_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::status(e.status(), e.body_text()))?,
                );
            }
            other => {
                tracing::debug!("Ignoring multipart field '{}'", other);
            }
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file provided. Use field name 'file'".to_string()))?;

    let project_id = project_id
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());

    tracing::info!(
        project = %project_id,
        filename = %file.file_name,
        size = file.data.len(),
        "UPLOAD REQUEST"
    );

    if file.file_name.is_empty() {
        return Err(AppError::BadRequest("Filename is empty".to_string()));
    }

    let content_type = resolve_content_type(content_type, file.content_type, &file.file_name);

    let request = UploadRequest::new(file.data, file.file_name)
        .with_content_type(content_type)
        .with_project(project_id);

    let result = state.orchestrator().upload_file(request).await?;
    Ok(Json(result))
}

/// Drop the cached reference for a digest
async fn invalidate_cache(
    State(state): State<AppState>,
    Path(digest): Path<String>,
) -> Result<StatusCode> {
    let removed = state.orchestrator().invalidate(&digest).await?;
    tracing::debug!(digest = %digest, removed, "Invalidate request handled");
    Ok(StatusCode::NO_CONTENT)
}

/// Explicit form value, then the part's own type, then a guess from the
/// file name
fn resolve_content_type(explicit: Option<String>, part: Option<String>, file_name: &str) -> String {
    explicit
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or(part.filter(|t| !t.is_empty()))
        .or_else(|| mime_guess::from_path(file_name).first_raw().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}
