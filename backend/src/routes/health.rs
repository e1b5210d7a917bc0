use std::sync::Arc;

use aide::axum::IntoApiResponse;
use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::media_storage::{ObjectStore, StorageProvider};

/// Body of `GET /health`
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    status: &'static str,
    /// Storage provider uploads are forwarded to
    provider: StorageProvider,
    /// Current version of the application
    semver: &'static str,
    /// Commit hash of the current build (if available)
    rev: Option<&'static str>,
}

/// Liveness string served on `/`
#[allow(clippy::unused_async)]
pub async fn hello() -> &'static str {
    "Hello World"
}

/// Health check endpoint
///
/// Reports the configured storage provider and the build version.
#[allow(clippy::unused_async)]
pub async fn handler(Extension(store): Extension<Arc<dyn ObjectStore>>) -> impl IntoApiResponse {
    Json(HealthResponse {
        status: "ok",
        provider: store.provider(),
        semver: env!("CARGO_PKG_VERSION"),
        rev: option_env!("GIT_REV"),
    })
}
