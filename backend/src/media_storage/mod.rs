//! Object storage providers behind a single trait
mod error;

pub mod cloudinary;
pub mod firebase;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use error::{StorageError, StorageResult};

use crate::types::StorageConfig;
use cloudinary::CloudinaryStorage;
use firebase::FirebaseStorage;

/// Vendor classification needed to address a Cloudinary object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Still images
    #[default]
    Image,
    /// Video files
    Video,
}

impl ResourceType {
    /// Path segment used by the provider API
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(format!("unknown resource type: {other}")),
        }
    }
}

/// An object ready to be written to the provider
#[derive(Debug, Clone)]
pub struct PutObject {
    /// Key the object is stored under
    pub key: String,
    /// Full file contents
    pub bytes: Bytes,
    /// MIME type reported by the client
    pub content_type: String,
    /// Resource type, for providers that partition objects by it
    pub resource_type: Option<ResourceType>,
}

/// What the provider reported after a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The object was removed
    Deleted,
    /// The provider returned a result string (e.g. `ok` or `not found`)
    Result(String),
}

/// Which provider a store talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    /// Firebase Cloud Storage
    Firebase,
    /// Cloudinary
    Cloudinary,
    /// In-process map, for tests
    Memory,
}

/// Object store operations shared by every provider
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes the object and returns a URL it can be read from
    async fn put(&self, object: PutObject) -> StorageResult<String>;

    /// Removes the object stored under `key`
    async fn delete(
        &self,
        key: &str,
        resource_type: Option<ResourceType>,
    ) -> StorageResult<DeleteOutcome>;

    /// The provider behind this store
    fn provider(&self) -> StorageProvider;
}

/// Builds the object store selected by `config`
///
/// # Errors
///
/// Returns `StorageError::Auth` if the configured credentials cannot be loaded
pub fn create_object_store(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("upload-backend/", env!("CARGO_PKG_VERSION")))
        .build()?;

    match config {
        StorageConfig::Firebase(config) => {
            Ok(Arc::new(FirebaseStorage::new(client, config.clone())?))
        }
        StorageConfig::Cloudinary(config) => {
            Ok(Arc::new(CloudinaryStorage::new(client, config.clone())))
        }
    }
}

/// Pulls a human readable message out of a provider error body
///
/// Both providers wrap errors as `{"error": {"message": "..."}}`.
pub(crate) fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Turns a non-success response into `StorageError::Rejected`
pub(crate) async fn reject(response: reqwest::Response) -> StorageError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    StorageError::Rejected {
        status,
        message: provider_error_message(&body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_parsing() {
        assert_eq!("image".parse::<ResourceType>(), Ok(ResourceType::Image));
        assert_eq!(" VIDEO ".parse::<ResourceType>(), Ok(ResourceType::Video));
        assert!("raw".parse::<ResourceType>().is_err());
        assert_eq!(ResourceType::default(), ResourceType::Image);
    }

    #[test]
    fn test_provider_error_message() {
        assert_eq!(
            provider_error_message(r#"{"error":{"code":404,"message":"No such object"}}"#),
            "No such object"
        );
        assert_eq!(
            provider_error_message(r#"{"error":{"message":"Invalid Signature"}}"#),
            "Invalid Signature"
        );
        assert_eq!(provider_error_message(" Bad Gateway \n"), "Bad Gateway");
    }
}
