use std::sync::Arc;

use axum::{Extension, Json};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    media_storage::{ObjectStore, PutObject},
    types::AppError,
    upload::{FileUpload, UploadPolicy},
};

/// Body of a successful upload
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadResponse {
    /// URL the stored file can be read from
    pub url: String,
}

/// Stores the file sent in the `file` multipart field
///
/// 1. Resolves the resource type from the MIME type when the provider needs one
/// 2. Names the object after the current time in milliseconds
/// 3. Writes the bytes to the storage provider and returns its read URL
///
/// # Errors
///
/// - 400 when no file was sent or its type is not supported
/// - 413 when the file is larger than 5 MiB
/// - 500 when the storage provider fails
#[instrument(skip_all, fields(file_name = %upload.original_file_name, size = upload.bytes.len()))]
pub async fn upload_file(
    Extension(store): Extension<Arc<dyn ObjectStore>>,
    Extension(policy): Extension<UploadPolicy>,
    FileUpload(upload): FileUpload,
) -> Result<Json<UploadResponse>, AppError> {
    let resource_type = policy.resource_types.resolve(&upload.mime_type)?;
    let key = policy.keys.object_key(&upload.original_file_name, Utc::now());

    tracing::info!("Storing upload as {key} ({})", upload.mime_type);

    let url = store
        .put(PutObject {
            key,
            bytes: upload.bytes,
            content_type: upload.mime_type,
            resource_type,
        })
        .await?;

    Ok(Json(UploadResponse { url }))
}
