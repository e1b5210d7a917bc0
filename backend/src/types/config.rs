//! Storage provider configuration read once at startup

use std::{env, fmt, time::Duration};

use thiserror::Error;
use url::Url;

use crate::{
    media_storage::{cloudinary::SignatureAlgorithm, firebase::FAR_FUTURE_EXPIRY},
    upload::ResourceTypePolicy,
};

/// Default Google Cloud Storage JSON API endpoint
pub const DEFAULT_FIREBASE_ENDPOINT: &str = "https://storage.googleapis.com";
/// Default Google OAuth token endpoint
pub const DEFAULT_GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Default Cloudinary API endpoint
pub const DEFAULT_CLOUDINARY_ENDPOINT: &str = "https://api.cloudinary.com";
/// Longest accepted `SIGNED_URL_TTL_SECS`, the distance from the epoch to the far-future expiry
pub const MAX_SIGNED_URL_TTL_SECS: u64 = FAR_FUTURE_EXPIRY.unsigned_abs();

/// Errors raised while reading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be used
    #[error("Invalid value for {name}: {value}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Which storage provider the service talks to
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Firebase Cloud Storage
    Firebase(FirebaseConfig),
    /// Cloudinary
    Cloudinary(CloudinaryConfig),
}

impl StorageConfig {
    /// Reads the provider configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STORAGE_PROVIDER` or any variable the chosen
    /// provider requires is missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`StorageConfig::from_env`] but reads variables through `lookup`
    ///
    /// # Errors
    ///
    /// See [`StorageConfig::from_env`]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider = required(&lookup, "STORAGE_PROVIDER")?.to_lowercase();

        match provider.as_str() {
            "firebase" => FirebaseConfig::from_lookup(&lookup).map(Self::Firebase),
            "cloudinary" => CloudinaryConfig::from_lookup(&lookup).map(Self::Cloudinary),
            _ => Err(ConfigError::Invalid {
                name: "STORAGE_PROVIDER",
                value: provider,
            }),
        }
    }
}

/// Firebase service account and bucket settings
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Firebase project the bucket belongs to
    pub project_id: String,
    /// Service account email, also the `GoogleAccessId` of signed URLs
    pub client_email: String,
    /// PEM encoded RSA key with real newlines
    pub private_key: String,
    /// Bucket name, e.g. `<project>.appspot.com`
    pub bucket: String,
    /// Cloud Storage JSON API and download host
    pub endpoint: Url,
    /// OAuth token endpoint the service account JWT is exchanged at
    pub token_uri: Url,
    /// Upload objects with the `publicRead` ACL
    pub public_objects: bool,
    /// Lifetime of signed read URLs; `None` uses the fixed far-future expiry
    pub signed_url_ttl: Option<Duration>,
}

impl FirebaseConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let project_id = required(lookup, "FIREBASE_PROJECT_ID")?;
        let private_key = unescape_newlines(&required(lookup, "FIREBASE_PRIVATE_KEY")?);
        let client_email = required(lookup, "FIREBASE_CLIENT_EMAIL")?;
        let bucket = required(lookup, "FIREBASE_STORAGE_BUCKET")?;

        let endpoint = url_or_default(lookup, "FIREBASE_STORAGE_ENDPOINT", DEFAULT_FIREBASE_ENDPOINT)?;
        let token_uri = url_or_default(lookup, "FIREBASE_TOKEN_URI", DEFAULT_GOOGLE_TOKEN_URI)?;

        let public_objects = match lookup("FIREBASE_PUBLIC_OBJECTS") {
            None => true,
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: "FIREBASE_PUBLIC_OBJECTS",
                value,
            })?,
        };

        let signed_url_ttl = lookup("SIGNED_URL_TTL_SECS")
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs <= MAX_SIGNED_URL_TTL_SECS)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::Invalid {
                        name: "SIGNED_URL_TTL_SECS",
                        value,
                    })
            })
            .transpose()?;

        Ok(Self {
            project_id,
            client_email,
            private_key,
            bucket,
            endpoint,
            token_uri,
            public_objects,
            signed_url_ttl,
        })
    }
}

impl fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint.as_str())
            .field("token_uri", &self.token_uri.as_str())
            .field("public_objects", &self.public_objects)
            .field("signed_url_ttl", &self.signed_url_ttl)
            .finish()
    }
}

/// Cloudinary credentials and upload behaviour
#[derive(Clone)]
pub struct CloudinaryConfig {
    /// Cloud the media lives in
    pub cloud_name: String,
    /// Public API key sent with every signed request
    pub api_key: String,
    /// Secret appended to the parameters before hashing
    pub api_secret: String,
    /// Upload API host
    pub endpoint: Url,
    /// How the upload resource type is chosen
    pub resource_types: ResourceTypePolicy,
    /// Digest the account verifies signatures with
    pub signature_algorithm: SignatureAlgorithm,
}

impl CloudinaryConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let (cloud_name, api_key, api_secret) = match lookup("CLOUDINARY_URL") {
            Some(value) => parse_cloudinary_url(&value)?,
            None => (
                required(lookup, "CLOUDINARY_CLOUD_NAME")?,
                required(lookup, "CLOUDINARY_API_KEY")?,
                required(lookup, "CLOUDINARY_API_SECRET")?,
            ),
        };

        let endpoint =
            url_or_default(lookup, "CLOUDINARY_API_ENDPOINT", DEFAULT_CLOUDINARY_ENDPOINT)?;

        let resource_types = match lookup("CLOUDINARY_RESOURCE_TYPE") {
            None => ResourceTypePolicy::default_cloudinary(),
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "CLOUDINARY_RESOURCE_TYPE",
                value,
            })?,
        };

        let signature_algorithm = match lookup("CLOUDINARY_SIGNATURE_ALGORITHM") {
            None => SignatureAlgorithm::default(),
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "CLOUDINARY_SIGNATURE_ALGORITHM",
                value,
            })?,
        };

        Ok(Self {
            cloud_name,
            api_key,
            api_secret,
            endpoint,
            resource_types,
            signature_algorithm,
        })
    }
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("resource_types", &self.resource_types)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

/// Splits `cloudinary://<api_key>:<api_secret>@<cloud_name>`
fn parse_cloudinary_url(value: &str) -> Result<(String, String, String), ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: "CLOUDINARY_URL",
        value: "<redacted>".to_string(),
    };

    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if url.scheme() != "cloudinary" {
        return Err(invalid());
    }

    let api_key = url.username();
    let api_secret = url.password().unwrap_or_default();
    let cloud_name = url.host_str().unwrap_or_default();

    if api_key.is_empty() || api_secret.is_empty() || cloud_name.is_empty() {
        return Err(invalid());
    }

    Ok((
        cloud_name.to_string(),
        api_key.to_string(),
        api_secret.to_string(),
    ))
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn url_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<Url, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    Url::parse(&value).map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Keys pasted into a single-line env var carry literal `\n` sequences
fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}
