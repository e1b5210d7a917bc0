mod delete;
mod docs;
mod health;
mod upload;

use aide::axum::{
    routing::{delete, get, post},
    ApiRouter,
};

use crate::types::Environment;

pub use delete::{DeleteQuery, DeleteResponse};
pub use upload::UploadResponse;

/// Creates the router with all handler routes
pub fn handler(environment: Environment) -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler(environment))
        .route("/", axum::routing::get(health::hello))
        .api_route("/health", get(health::handler))
        .api_route("/upload", post(upload::upload_file))
        .api_route("/delete/{file_name}", delete(delete::delete_file))
        .route("/delete", axum::routing::delete(delete::missing_file_name))
        .route("/delete/", axum::routing::delete(delete::missing_file_name))
}
