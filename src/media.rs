//! Storage of base64 data-URI images under the configured media root

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::Path;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Decode a `data:image/...;base64,...` payload
///
/// Returns the file extension taken from the mime subtype and the raw bytes.
pub fn parse_data_uri(data: &str) -> AppResult<(String, Vec<u8>)> {
    let rest = data
        .strip_prefix("data:image/")
        .ok_or_else(|| AppError::BadRequest("Expected a base64 image data URI".to_string()))?;

    let (ext, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::BadRequest("Expected a base64 image data URI".to_string()))?;

    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::BadRequest("Unsupported image format".to_string()));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 image data: {e}")))?;

    Ok((ext.to_string(), bytes))
}

/// Write a decoded data-URI image below `media_root/subdir`
///
/// Returns the path relative to the media root, which is what gets stored on
/// the user or recipe row and echoed back in JSON.
pub async fn save_image(media_root: &str, subdir: &str, data: &str) -> AppResult<String> {
    let (ext, bytes) = parse_data_uri(data)?;

    let dir = Path::new(media_root).join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create media directory: {e}")))?;

    let filename = format!("{}.{ext}", Uuid::new_v4().simple());
    tokio::fs::write(dir.join(&filename), bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write image: {e}")))?;

    Ok(format!("{subdir}/{filename}"))
}

/// Best-effort removal of a previously stored image
pub async fn delete_image(media_root: &str, relative_path: &str) {
    let path = Path::new(media_root).join(relative_path);
    if let Err(err) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), err = %err, "Failed to remove media file");
    }
}
