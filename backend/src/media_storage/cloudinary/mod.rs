//! Cloudinary provider
mod signature;

use async_trait::async_trait;
use chrono::Utc;
use mime::Mime;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

pub use signature::{sign_params, SignatureAlgorithm};

use super::{
    reject, DeleteOutcome, ObjectStore, PutObject, ResourceType, StorageError, StorageProvider,
    StorageResult,
};
use crate::types::CloudinaryConfig;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    #[serde(default)]
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Stores objects through the Cloudinary upload API
pub struct CloudinaryStorage {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStorage {
    /// Creates a new Cloudinary storage client
    #[must_use]
    pub fn new(client: reqwest::Client, config: CloudinaryConfig) -> Self {
        info!(
            "Initialized Cloudinary storage for cloud {} ({:?})",
            config.cloud_name, config.resource_types
        );

        Self { client, config }
    }

    fn api_url(&self, resource_type: ResourceType, action: &str) -> StorageResult<Url> {
        let mut url = self.config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::Config("Invalid Cloudinary endpoint".to_string()))?
            .pop_if_empty()
            .extend([
                "v1_1",
                self.config.cloud_name.as_str(),
                resource_type.as_str(),
                action,
            ]);
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStorage {
    #[instrument(skip(self, object), fields(key = %object.key, size = object.bytes.len()))]
    async fn put(&self, object: PutObject) -> StorageResult<String> {
        let resource_type = object.resource_type.unwrap_or_default();
        let url = self.api_url(resource_type, "upload")?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("overwrite", "true"),
                ("public_id", object.key.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
            self.config.signature_algorithm,
        );

        // Cloudinary detects the format itself; unparsable client types go out as octet-stream
        let content_type = object.content_type.parse::<Mime>().unwrap_or_else(|_| {
            debug!("Sending {:?} as {}", object.content_type, mime::APPLICATION_OCTET_STREAM);
            mime::APPLICATION_OCTET_STREAM
        });

        let length = object.bytes.len() as u64;
        let file = Part::stream_with_length(object.bytes, length)
            .file_name(object.key.clone())
            .mime_str(content_type.as_ref())
            .map_err(|e| StorageError::Config(format!("Invalid content type: {e}")))?;

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("public_id", object.key.clone())
            .text("overwrite", "true")
            .text("signature", signature);

        let response = self.client.post(url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(format!("Upload response: {e}")))?;

        debug!("Cloudinary public id: {:?}", uploaded.public_id);
        info!("Uploaded {} as {resource_type}", object.key);

        Ok(uploaded.secure_url)
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        key: &str,
        resource_type: Option<ResourceType>,
    ) -> StorageResult<DeleteOutcome> {
        let resource_type = resource_type.unwrap_or_default();
        let url = self.api_url(resource_type, "destroy")?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", key), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
            self.config.signature_algorithm,
        );

        let response = self
            .client
            .post(url)
            .form(&[
                ("public_id", key),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(format!("Destroy response: {e}")))?;

        info!("Destroy {key} as {resource_type}: {}", destroyed.result);
        Ok(DeleteOutcome::Result(destroyed.result))
    }

    fn provider(&self) -> StorageProvider {
        StorageProvider::Cloudinary
    }
}
