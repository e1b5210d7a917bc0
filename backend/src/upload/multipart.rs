//! Single-file multipart extractor

use aide::{operation::OperationInput, OperationOutput};
use axum::extract::{FromRequest, Multipart, Request};
use bytes::BytesMut;

use super::UploadRequest;
use crate::types::AppError;

/// Name of the multipart field carrying the file
pub const UPLOAD_FIELD: &str = "file";

/// Largest accepted file, 5 MiB
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Room left in the request body limit for multipart framing and text fields
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Extracts the one file sent in the `file` field of a multipart body
///
/// Text fields are ignored. The file is buffered in memory and refused with
/// 413 as soon as it grows past [`MAX_FILE_BYTES`].
#[derive(Debug)]
pub struct FileUpload(pub UploadRequest);

impl<S> FromRequest<S> for FileUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // A body that is not multipart cannot carry a file
        let mut multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!("Not a multipart request: {rejection}");
            AppError::no_file_uploaded()
        })?;

        let mut upload = None;

        while let Some(mut field) = multipart.next_field().await? {
            let Some(file_name) = field
                .file_name()
                .filter(|name| !name.is_empty())
                .map(ToString::to_string)
            else {
                continue;
            };

            if field.name() != Some(UPLOAD_FIELD) || upload.is_some() {
                return Err(AppError::unexpected_field());
            }

            let mime_type = field
                .content_type()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
                .to_string();

            let mut bytes = BytesMut::new();
            while let Some(chunk) = field.chunk().await? {
                if bytes.len() + chunk.len() > MAX_FILE_BYTES {
                    return Err(AppError::file_too_large());
                }
                bytes.extend_from_slice(&chunk);
            }

            upload = Some(UploadRequest {
                bytes: bytes.freeze(),
                original_file_name: file_name,
                mime_type,
            });
        }

        upload.map(Self).ok_or_else(AppError::no_file_uploaded)
    }
}

impl OperationInput for FileUpload {
    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        // Document validation error responses
        AppError::inferred_responses(ctx, operation)
    }
}
