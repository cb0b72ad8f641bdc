use axum::extract::Multipart;
use axum::{extract::State, Extension, Json};
use serde_json::json;

use crate::{
    config::Environment,
    error::{AppError, Result},
    services::storage_service,
    utils::jwt::Claims,
    AppState,
};

/// Accepts one file field and returns its public URL. Used by the admin
/// dashboard for course images and documents.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let filename = field
        .file_name()
        .unwrap_or("upload")
        .to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let folder = match state.environment {
        Environment::Staging => "uploads-staging",
        Environment::Main => "uploads-main",
    };

    let key = storage_service::object_key(folder, &filename);
    let url = storage_service::public_url(&state.assets_url, &key);

    // Demo uploads never reach the bucket; the URL is shaped like a real one
    // but nothing is stored behind it.
    if claims.is_demo {
        return Ok(Json(json!({ "url": url })));
    }

    storage_service::upload_object(
        &state.s3_client,
        &state.s3_bucket,
        &key,
        &content_type,
        bytes.to_vec(),
    )
    .await?;

    Ok(Json(json!({ "url": url })))
}
