//! Service account authentication against Google OAuth

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::media_storage::{reject, StorageError, StorageResult};

const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.full_control";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Issues OAuth access tokens and RSA signatures for one service account
pub struct ServiceAccount {
    client: reqwest::Client,
    client_email: String,
    token_uri: Url,
    key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl ServiceAccount {
    /// Loads the PEM encoded private key of the service account
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Auth` if the key is not a valid RSA PEM
    pub fn new(
        client: reqwest::Client,
        client_email: String,
        token_uri: Url,
        private_key_pem: &str,
    ) -> StorageResult<Self> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;

        Ok(Self {
            client,
            client_email,
            token_uri,
            key,
            token: Mutex::new(None),
        })
    }

    /// Service account email, used as `GoogleAccessId`
    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Returns a cached access token, refreshing it shortly before expiry
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token endpoint rejects the assertion
    pub async fn access_token(&self) -> StorageResult<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);

        Ok(value)
    }

    /// RSA-SHA256 signature over `message`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Auth` if signing fails
    pub fn sign(&self, message: &[u8]) -> StorageResult<Vec<u8>> {
        let encoded = jsonwebtoken::crypto::sign(message, &self.key, Algorithm::RS256)?;

        URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| StorageError::Auth(format!("Malformed signature encoding: {e}")))
    }

    async fn fetch_token(&self) -> StorageResult<CachedToken> {
        let now = Utc::now();
        let claims = Claims {
            iss: &self.client_email,
            scope: STORAGE_SCOPE,
            aud: self.token_uri.as_str(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)?;

        let response = self
            .client
            .post(self.token_uri.clone())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(format!("Token response: {e}")))?;

        debug!(
            "Obtained access token for {} valid for {}s",
            self.client_email, token.expires_in
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_freshness() {
        let now = Utc::now();
        let token = CachedToken {
            value: "token".to_string(),
            expires_at: now + Duration::seconds(120),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(61)));
    }

    #[test]
    fn test_rejects_invalid_private_key() {
        let result = ServiceAccount::new(
            reqwest::Client::new(),
            "uploader@example.iam.gserviceaccount.com".to_string(),
            Url::parse("https://oauth2.googleapis.com/token").unwrap(),
            "not a key",
        );
        assert!(matches!(result, Err(StorageError::Auth(_))));
    }
}
