//! Firebase Cloud Storage provider
mod auth;
mod signed_url;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, instrument};
use url::Url;

pub use auth::ServiceAccount;
pub use signed_url::{signed_read_url, FAR_FUTURE_EXPIRY};

use super::{
    reject, DeleteOutcome, ObjectStore, PutObject, ResourceType, StorageError, StorageProvider,
    StorageResult,
};
use crate::types::FirebaseConfig;

/// Stores objects in a Firebase bucket through the Cloud Storage JSON API
pub struct FirebaseStorage {
    client: reqwest::Client,
    account: ServiceAccount,
    config: FirebaseConfig,
}

impl FirebaseStorage {
    /// Creates a new Firebase storage client
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Auth` if the private key cannot be loaded and
    /// `StorageError::Config` if the endpoint cannot carry a path
    pub fn new(client: reqwest::Client, config: FirebaseConfig) -> StorageResult<Self> {
        if config.endpoint.cannot_be_a_base() {
            return Err(StorageError::Config(format!(
                "Invalid storage endpoint: {}",
                config.endpoint
            )));
        }

        let account = ServiceAccount::new(
            client.clone(),
            config.client_email.clone(),
            config.token_uri.clone(),
            &config.private_key,
        )?;

        info!(
            "Initialized Firebase storage for project {} bucket {}",
            config.project_id, config.bucket
        );

        Ok(Self {
            client,
            account,
            config,
        })
    }

    fn api_url(&self, segments: &[&str]) -> StorageResult<Url> {
        let mut url = self.config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::Config("Invalid storage endpoint".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Unix time the signed URL of an upload made now stops working
    fn expires_at(&self) -> StorageResult<i64> {
        let Some(ttl) = self.config.signed_url_ttl else {
            return Ok(FAR_FUTURE_EXPIRY);
        };

        i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| Utc::now().timestamp().checked_add(secs))
            .ok_or_else(|| {
                StorageError::Config(format!("Signed URL lifetime out of range: {ttl:?}"))
            })
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    #[instrument(skip(self, object), fields(key = %object.key, size = object.bytes.len()))]
    async fn put(&self, object: PutObject) -> StorageResult<String> {
        let expires = self.expires_at()?;
        let token = self.account.access_token().await?;
        let url = self.api_url(&["upload", "storage", "v1", "b", self.config.bucket.as_str(), "o"])?;

        let mut query = vec![("uploadType", "media"), ("name", object.key.as_str())];
        if self.config.public_objects {
            query.push(("predefinedAcl", "publicRead"));
        }

        let response = self
            .client
            .post(url)
            .query(&query)
            .bearer_auth(token)
            .header(CONTENT_TYPE, &object.content_type)
            .body(object.bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        info!("Uploaded {} to bucket {}", object.key, self.config.bucket);

        signed_read_url(
            &self.config.endpoint,
            &self.config.bucket,
            &object.key,
            self.account.client_email(),
            expires,
            |message| self.account.sign(message),
        )
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        key: &str,
        _resource_type: Option<ResourceType>,
    ) -> StorageResult<DeleteOutcome> {
        let token = self.account.access_token().await?;
        let url = self.api_url(&["storage", "v1", "b", self.config.bucket.as_str(), "o", key])?;

        let response = self.client.delete(url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        info!("Deleted {} from bucket {}", key, self.config.bucket);
        Ok(DeleteOutcome::Deleted)
    }

    fn provider(&self) -> StorageProvider {
        StorageProvider::Firebase
    }
}
