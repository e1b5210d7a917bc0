use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    media_storage::{DeleteOutcome, ObjectStore, ResourceType},
    types::AppError,
};

/// Path parameters of `DELETE /delete/{file_name}`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeletePath {
    /// Key the object was stored under
    pub file_name: String,
}

/// Query parameters of `DELETE /delete/{file_name}`
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DeleteQuery {
    /// `image` (default) or `video`; only Cloudinary uses it
    pub resource_type: Option<String>,
}

/// Body of a successful delete, shaped by what the provider reports
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteResponse {
    /// Set when the provider only reports success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Provider result string, e.g. `ok` or `not found`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::Deleted => Self {
                message: Some("File deleted successfully".to_string()),
                result: None,
            },
            DeleteOutcome::Result(result) => Self {
                message: None,
                result: Some(result),
            },
        }
    }
}

/// Deletes the object stored under `file_name`
///
/// # Errors
///
/// - 400 when the name is blank or `resource_type` is unknown
/// - 500 when the storage provider fails
#[instrument(skip(store))]
pub async fn delete_file(
    Extension(store): Extension<Arc<dyn ObjectStore>>,
    Path(DeletePath { file_name }): Path<DeletePath>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    if file_name.trim().is_empty() {
        return Err(AppError::no_file_name());
    }

    let resource_type = query
        .resource_type
        .as_deref()
        .map(str::parse::<ResourceType>)
        .transpose()
        .map_err(|msg| {
            AppError::new(
                axum::http::StatusCode::BAD_REQUEST,
                "invalid_resource_type",
                msg,
            )
        })?;

    let outcome = store.delete(&file_name, resource_type).await?;
    tracing::info!("Deleted {file_name}: {outcome:?}");

    Ok(Json(outcome.into()))
}

/// `/delete` and `/delete/` carry no name to delete
#[allow(clippy::unused_async)]
pub async fn missing_file_name() -> AppError {
    AppError::no_file_name()
}
