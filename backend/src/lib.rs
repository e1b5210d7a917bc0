//! Upload backend service
//!
//! Accepts a single multipart file upload, forwards it to Firebase Cloud
//! Storage or Cloudinary and deletes stored objects by key.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]
#![allow(clippy::module_name_repetitions)]

/// Storage providers
pub mod media_storage;

/// HTTP routes
pub mod routes;

/// Server setup
pub mod server;

/// Configuration and error types
pub mod types;

/// Upload decoding and naming
pub mod upload;
