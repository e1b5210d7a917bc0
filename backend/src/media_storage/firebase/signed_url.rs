//! V2 signed read URLs for Cloud Storage objects

use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::Url;

use crate::media_storage::{StorageError, StorageResult};

/// 2491-03-09T00:00:00Z, the expiry used when no TTL is configured
pub const FAR_FUTURE_EXPIRY: i64 = 16_447_017_600;

/// Builds `<endpoint>/<bucket>/<key>?GoogleAccessId=..&Expires=..&Signature=..`
///
/// The signature covers `GET\n\n\n<expires>\n/<bucket>/<key>`.
///
/// # Errors
///
/// Returns `StorageError::Config` if `endpoint` cannot carry a path and
/// whatever `sign` returns on failure
pub fn signed_read_url(
    endpoint: &Url,
    bucket: &str,
    key: &str,
    access_id: &str,
    expires: i64,
    sign: impl FnOnce(&[u8]) -> StorageResult<Vec<u8>>,
) -> StorageResult<String> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|()| StorageError::Config(format!("Invalid storage endpoint: {endpoint}")))?
        .pop_if_empty()
        .push(bucket)
        .push(key);

    let string_to_sign = format!("GET\n\n\n{expires}\n{}", url.path());
    let signature = STANDARD.encode(sign(string_to_sign.as_bytes())?);

    url.query_pairs_mut()
        .append_pair("GoogleAccessId", access_id)
        .append_pair("Expires", &expires.to_string())
        .append_pair("Signature", &signature);

    Ok(url.into())
}
