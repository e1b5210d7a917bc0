//! Upload decoding and the per-provider upload policy
mod key;
mod multipart;

use std::str::FromStr;

use bytes::Bytes;
use mime::Mime;

pub use key::KeyPolicy;
pub use multipart::{FileUpload, MAX_FILE_BYTES, MULTIPART_OVERHEAD_BYTES, UPLOAD_FIELD};

use crate::{
    media_storage::ResourceType,
    types::{AppError, StorageConfig},
};

/// A file received on `POST /upload`
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Full file contents
    pub bytes: Bytes,
    /// File name as sent by the client
    pub original_file_name: String,
    /// MIME type as sent by the client
    pub mime_type: String,
}

/// How the Cloudinary resource type of an upload is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceTypePolicy {
    /// Provider does not partition objects by resource type
    Unrestricted,
    /// Every upload gets the same resource type
    Fixed(ResourceType),
    /// `image/*` and `video/*` map to their resource type, anything else is refused
    FromMime,
}

impl ResourceTypePolicy {
    /// Image-only uploads
    #[must_use]
    pub const fn default_cloudinary() -> Self {
        Self::Fixed(ResourceType::Image)
    }

    /// Resource type for an upload of `mime_type`
    ///
    /// # Errors
    ///
    /// Returns a 400 `AppError` when the policy derives the type from the MIME
    /// type and it is neither an image nor a video
    pub fn resolve(&self, mime_type: &str) -> Result<Option<ResourceType>, AppError> {
        match self {
            Self::Unrestricted => Ok(None),
            Self::Fixed(resource_type) => Ok(Some(*resource_type)),
            Self::FromMime => {
                let mime: Mime = mime_type
                    .parse()
                    .map_err(|_| AppError::unsupported_file_type())?;

                if mime.type_() == mime::IMAGE {
                    Ok(Some(ResourceType::Image))
                } else if mime.type_() == mime::VIDEO {
                    Ok(Some(ResourceType::Video))
                } else {
                    Err(AppError::unsupported_file_type())
                }
            }
        }
    }
}

impl FromStr for ResourceTypePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "mime" => Ok(Self::FromMime),
            other => other.parse().map(Self::Fixed),
        }
    }
}

/// Everything the upload route needs to know about the configured provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// How object keys are named
    pub keys: KeyPolicy,
    /// How the resource type is chosen
    pub resource_types: ResourceTypePolicy,
}

impl UploadPolicy {
    /// Firebase keeps the original extension and has no resource types
    pub const FIREBASE: Self = Self {
        keys: KeyPolicy::TimestampWithExtension,
        resource_types: ResourceTypePolicy::Unrestricted,
    };

    /// Policy matching the configured provider
    #[must_use]
    pub const fn for_config(config: &StorageConfig) -> Self {
        match config {
            StorageConfig::Firebase(_) => Self::FIREBASE,
            StorageConfig::Cloudinary(config) => Self::cloudinary(config.resource_types),
        }
    }

    /// Cloudinary uses bare timestamps as public ids
    #[must_use]
    pub const fn cloudinary(resource_types: ResourceTypePolicy) -> Self {
        Self {
            keys: KeyPolicy::Timestamp,
            resource_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_mime_policy_accepts_images_and_videos() {
        let policy = ResourceTypePolicy::FromMime;
        assert_eq!(policy.resolve("image/png").unwrap(), Some(ResourceType::Image));
        assert_eq!(policy.resolve("image/jpeg").unwrap(), Some(ResourceType::Image));
        assert_eq!(policy.resolve("video/mp4").unwrap(), Some(ResourceType::Video));
    }

    #[test]
    fn test_mime_policy_rejects_everything_else() {
        let policy = ResourceTypePolicy::FromMime;
        for mime_type in ["application/pdf", "text/plain", "audio/mpeg", "not a mime"] {
            let err = policy.resolve(mime_type).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert_eq!(err.code(), "unsupported_file_type");
        }
    }

    #[test]
    fn test_fixed_policy_ignores_mime() {
        let policy = ResourceTypePolicy::default_cloudinary();
        assert_eq!(
            policy.resolve("application/pdf").unwrap(),
            Some(ResourceType::Image)
        );
        assert_eq!(ResourceTypePolicy::Unrestricted.resolve("application/pdf").unwrap(), None);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("auto".parse::<ResourceTypePolicy>(), Ok(ResourceTypePolicy::FromMime));
        assert_eq!(
            "image".parse::<ResourceTypePolicy>(),
            Ok(ResourceTypePolicy::Fixed(ResourceType::Image))
        );
        assert_eq!(
            "Video".parse::<ResourceTypePolicy>(),
            Ok(ResourceTypePolicy::Fixed(ResourceType::Video))
        );
        assert!("raw".parse::<ResourceTypePolicy>().is_err());
    }

    #[test]
    fn test_upload_policy_per_provider() {
        assert_eq!(UploadPolicy::FIREBASE.keys, KeyPolicy::TimestampWithExtension);
        assert_eq!(
            UploadPolicy::cloudinary(ResourceTypePolicy::FromMime).keys,
            KeyPolicy::Timestamp
        );
    }
}
