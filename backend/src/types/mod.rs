mod config;
mod environment;
mod error;

pub use config::{CloudinaryConfig, ConfigError, FirebaseConfig, StorageConfig};
pub use environment::Environment;
pub use error::{ApiErrorResponse, AppError};
