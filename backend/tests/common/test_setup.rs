use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use http_body_util::BodyExt;
use tower::ServiceExt;
use upload_backend::{
    media_storage::memory::MemoryStore, server, types::Environment, upload::UploadPolicy,
};

use super::multipart::MultipartBody;

/// Base URL the memory store hands out
pub const STORE_URL: &str = "https://storage.test";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Router wired to an in-memory object store
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestSetup {
    pub fn new(policy: UploadPolicy) -> Self {
        Self::with_environment(Environment::Development, policy)
    }

    pub fn with_environment(environment: Environment, policy: UploadPolicy) -> Self {
        setup_test_env();

        let store = Arc::new(MemoryStore::new(STORE_URL));
        let router = server::router(environment, store.clone(), policy);

        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn send_delete_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("DELETE")
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn send_upload(&self, body: MultipartBody) -> Response {
        let request = Request::builder()
            .uri("/upload")
            .method("POST")
            .header("Content-Type", body.content_type())
            .body(Body::from(body.into_bytes()))
            .unwrap();
        self.send(request).await
    }

    /// Uploads `data` as the `file` field and returns the URL from the response
    pub async fn upload_file(&self, file_name: &str, content_type: &str, data: &[u8]) -> String {
        let response = self
            .send_upload(MultipartBody::new().file("file", file_name, content_type, data))
            .await;
        assert_eq!(response.status(), http::StatusCode::OK);

        let body = parse_response_body(response).await;
        body["url"].as_str().expect("url in response").to_string()
    }
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Read response body as text
pub async fn response_text(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Last path segment of a URL handed out by the memory store
pub fn key_from_url(url: &str) -> String {
    url.rsplit('/').next().unwrap().to_string()
}
