//! File Shelf Routes
//!
//! - GET /api/v1/files - List shared files
//! - POST /api/v1/files - Upload one or more files (multipart)
//! - DELETE /api/v1/files - Delete every file
//! - GET /api/v1/files/:name - Download a file
//! - DELETE /api/v1/files/:name - Delete a file

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{FileListResponse, UploadResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::{validate_file_name, UploadOutcome};
use crate::websocket::WsEvent;

/// GET /api/v1/files
pub async fn list_files(State(state): State<Arc<AppState>>) -> ApiResult<Json<FileListResponse>> {
    let files = state.shelf.list().await?;
    Ok(Json(FileListResponse { files }))
}

/// POST /api/v1/files
///
/// Every multipart field carrying a file name is stored. Names already on the
/// shelf are reported as skipped.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let response = store_uploads(&state, multipart).await?;

    let status = if response.stored.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(response)))
}

/// GET /api/v1/files/:name
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let contents = state.shelf.read(&name).await?;
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&name)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        contents,
    )
        .into_response())
}

/// DELETE /api/v1/files/:name
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    remove(&state, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/files
pub async fn delete_all_files(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    remove_all(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Store every file field of a multipart body.
///
/// The whole body is read and every name validated before anything is
/// written, so a rejected batch leaves the shelf untouched.
pub(crate) async fn store_uploads(
    state: &AppState,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(base_name) else {
            continue;
        };
        // Browsers send an empty part when no file was chosen
        if name.is_empty() {
            continue;
        }

        validate_file_name(&name)?;
        let contents = field.bytes().await?;
        uploads.push((name, contents));
    }

    if uploads.is_empty() {
        return Err(ApiError::Validation(
            "No file fields in upload".to_string(),
        ));
    }

    let mut response = UploadResponse::default();
    let result = write_uploads(state, uploads, &mut response).await;

    if !response.stored.is_empty() {
        notify_shelf_changed(state).await;
    }

    result.map(|()| response)
}

async fn write_uploads(
    state: &AppState,
    uploads: Vec<(String, Bytes)>,
    response: &mut UploadResponse,
) -> ApiResult<()> {
    for (name, contents) in uploads {
        match state.shelf.upload(&name, &contents).await? {
            UploadOutcome::Stored => response.stored.push(name),
            UploadOutcome::Skipped => response.skipped.push(name),
        }
    }
    Ok(())
}

/// Delete one file and notify subscribers
pub(crate) async fn remove(state: &AppState, name: &str) -> ApiResult<()> {
    state.shelf.delete(name).await?;
    notify_shelf_changed(state).await;
    Ok(())
}

/// Delete every file and notify subscribers
pub(crate) async fn remove_all(state: &AppState) -> ApiResult<()> {
    state.shelf.delete_all().await?;
    notify_shelf_changed(state).await;
    Ok(())
}

async fn notify_shelf_changed(state: &AppState) {
    match state.shelf.list().await {
        Ok(files) => state.ws_hub.publish(WsEvent::shelf_updated(files)).await,
        Err(e) => tracing::warn!(error = %e, "Failed to list shelf for notification"),
    }
}

/// Strip any client-side directory from an uploaded file name
fn base_name(name: &str) -> String {
    name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name).to_string()
}
