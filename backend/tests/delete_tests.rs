mod common;

use common::*;

use http::StatusCode;
use upload_backend::{
    media_storage::ResourceType,
    types::Environment,
    upload::{ResourceTypePolicy, UploadPolicy},
};

// Happy path tests

#[tokio::test]
async fn test_delete_uploaded_file() {
    let setup = TestSetup::new(UploadPolicy::FIREBASE);
    let key = key_from_url(&setup.upload_file("notes.txt", "text/plain", b"hello").await);

    let response = setup.send_delete_request(&format!("/delete/{key}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "File deleted successfully");
    assert!(body.get("result").is_none());
    assert!(setup.store.is_empty());
}

#[tokio::test]
async fn test_delete_video_with_resource_type() {
    let setup = TestSetup::new(UploadPolicy::cloudinary(ResourceTypePolicy::FromMime));
    let key = key_from_url(&setup.upload_file("clip.mp4", "video/mp4", b"mp4").await);

    let response = setup
        .send_delete_request(&format!("/delete/{key}?resource_type=video"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(setup.store.get(&key, ResourceType::Video).is_none());
}

// Validation error tests

#[tokio::test]
async fn test_delete_without_file_name() {
    let setup = TestSetup::new(UploadPolicy::FIREBASE);

    for route in ["/delete", "/delete/", "/delete/%20"] {
        let response = setup.send_delete_request(route).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "route: {route}");
        let body = parse_response_body(response).await;
        assert_eq!(body["error"], "No file name provided");
        assert_eq!(body["code"], "no_file_name");
    }
}

#[tokio::test]
async fn test_delete_with_unknown_resource_type() {
    let setup = TestSetup::new(UploadPolicy::cloudinary(ResourceTypePolicy::FromMime));
    let key = key_from_url(&setup.upload_file("a.png", "image/png", b"png").await);

    let response = setup
        .send_delete_request(&format!("/delete/{key}?resource_type=raw"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["code"], "invalid_resource_type");
    assert_eq!(setup.store.len(), 1);
}

// Provider error tests

#[tokio::test]
async fn test_delete_unknown_key() {
    let setup = TestSetup::new(UploadPolicy::FIREBASE);

    let response = setup.send_delete_request("/delete/1700000000000.png").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["code"], "provider_error");
    assert_eq!(body["error"], "No such object: 1700000000000.png");
}

#[tokio::test]
async fn test_delete_video_without_resource_type() {
    let setup = TestSetup::new(UploadPolicy::cloudinary(ResourceTypePolicy::FromMime));
    let key = key_from_url(&setup.upload_file("clip.mp4", "video/mp4", b"mp4").await);

    // Defaults to image, where the key does not exist
    let response = setup.send_delete_request(&format!("/delete/{key}")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(setup.store.len(), 1);
}

// API docs

#[tokio::test]
async fn test_openapi_served_in_development() {
    let setup = TestSetup::with_environment(Environment::Development, UploadPolicy::FIREBASE);

    let response = setup.send_get_request("/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(body["paths"].get("/upload").is_some());
    assert!(body["paths"].get("/delete/{file_name}").is_some());
}

#[tokio::test]
async fn test_openapi_hidden_in_production() {
    let setup = TestSetup::with_environment(Environment::Production, UploadPolicy::FIREBASE);

    let response = setup.send_get_request("/openapi.json").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
