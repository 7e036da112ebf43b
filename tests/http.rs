//! End-to-end HTTP tests against the router with in-memory stores.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use content_api::domain::model::{NewRecord, RecordChanges};
use content_api::transport::http::error::panic_response;
use content_api::transport::http::{create_router, AppState};
use content_api::{ContentModel, EntityStore, MemoryEntityStore, MemoryObjectStore, Record, Status};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;

const BOUNDARY: &str = "content-api-test-boundary";

fn app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryEntityStore::new()),
        Arc::new(MemoryObjectStore::default()),
    );
    create_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

fn multipart_request(field: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"picture\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn create_blog(app: &Router, body: Value) -> Value {
    let (status, res) = send(app, json_request("POST", "/blogs", body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", res);
    res["data"].clone()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn create_blog_defaults_to_draft() {
    let app = app();
    let (status, body) = send(&app, json_request("POST", "/blogs", json!({"title": "A", "content": "B"}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], "Blog created");
    let data = &body["data"];
    assert!(data["id"].as_i64().unwrap() >= 1);
    assert_eq!(data["title"], "A");
    assert_eq!(data["content"], "B");
    assert_eq!(data["status"], "draft");
    assert_eq!(data["publishedAt"], Value::Null);
    assert_eq!(data["excerpt"], Value::Null);
    assert!(data["createdAt"].is_string());
    assert!(data["updatedAt"].is_string());
}

#[tokio::test]
async fn create_published_blog_is_stamped() {
    let app = app();
    let data = create_blog(&app, json!({"title": "A", "content": "B", "status": "published"})).await;
    assert_eq!(data["status"], "published");
    assert!(data["publishedAt"].is_string());
}

#[tokio::test]
async fn create_blog_rejects_missing_fields() {
    let app = app();
    let (status, body) = send(&app, json_request("POST", "/blogs", json!({"excerpt": "x"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"content"));
}

#[tokio::test]
async fn create_blog_rejects_unknown_status() {
    let app = app();
    let (status, body) = send(
        &app,
        json_request("POST", "/blogs", json!({"title": "A", "content": "B", "status": "archived"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/blogs")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn publishing_stamps_once() {
    let app = app();
    let created = create_blog(&app, json!({"title": "A", "content": "B"})).await;
    let uri = format!("/blogs/{}", created["id"]);

    let (status, body) = send(&app, json_request("PUT", &uri, json!({"status": "published"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Blog updated");
    let first = body["data"]["publishedAt"].clone();
    assert!(first.is_string());
    assert_eq!(body["data"]["title"], "A");

    // Back to draft keeps the timestamp, republishing does not move it.
    let (_, body) = send(&app, json_request("PUT", &uri, json!({"status": "draft"}))).await;
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["data"]["publishedAt"], first);

    let (_, body) = send(&app, json_request("PUT", &uri, json!({"status": "published"}))).await;
    assert_eq!(body["data"]["publishedAt"], first);
}

#[tokio::test]
async fn explicit_published_at_wins() {
    let app = app();
    let created = create_blog(&app, json!({"title": "A", "content": "B"})).await;
    let uri = format!("/blogs/{}", created["id"]);

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &uri,
            json!({"status": "published", "publishedAt": "2024-01-02T03:04:05Z"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let stamped = body["data"]["publishedAt"].as_str().unwrap();
    assert!(stamped.starts_with("2024-01-02T03:04:05"));
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let app = app();
    let created = create_blog(&app, json!({"title": "A", "content": "B", "excerpt": "E"})).await;
    let uri = format!("/blogs/{}", created["id"]);

    let (status, body) = send(&app, json_request("PUT", &uri, json!({"title": "  New  "}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "New");
    assert_eq!(body["data"]["content"], "B");
    assert_eq!(body["data"]["excerpt"], "E");
    assert_eq!(body["data"]["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn invalid_update_leaves_record_untouched() {
    let app = app();
    let created = create_blog(&app, json!({"title": "A", "content": "B"})).await;
    let uri = format!("/blogs/{}", created["id"]);

    let (status, _) = send(&app, json_request("PUT", &uri, json!({"title": "", "status": "published"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(body["data"]["title"], "A");
    assert_eq!(body["data"]["status"], "draft");
}

#[tokio::test]
async fn missing_blog_is_404_with_id() {
    let app = app();
    let (status, body) = send(&app, empty_request("GET", "/blogs/999999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("999999"));

    let (status, _) = send(&app, json_request("PUT", "/blogs/999999", json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let app = app();
    let (status, body) = send(&app, empty_request("GET", "/blogs/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "id");
}

#[tokio::test]
async fn list_is_newest_first_and_filters_by_status() {
    let app = app();
    let first = create_blog(&app, json!({"title": "first", "content": "x"})).await;
    let second = create_blog(&app, json!({"title": "second", "content": "x", "status": "published"})).await;
    let third = create_blog(&app, json!({"title": "third", "content": "x"})).await;

    let (status, body) = send(&app, empty_request("GET", "/blogs")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            third["id"].as_i64().unwrap(),
            second["id"].as_i64().unwrap(),
            first["id"].as_i64().unwrap()
        ]
    );

    let (_, body) = send(&app, empty_request("GET", "/blogs?status=published")).await;
    let published = body["data"].as_array().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0]["title"], "second");

    let (_, body) = send(&app, empty_request("GET", "/blogs?status=draft")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_status_filter_is_rejected() {
    let app = app();
    let (status, body) = send(&app, empty_request("GET", "/blogs?status=archived")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");
}

#[tokio::test]
async fn delete_twice_is_404() {
    let app = app();
    let created = create_blog(&app, json!({"title": "A", "content": "B"})).await;
    let uri = format!("/blogs/{}", created["id"]);

    let (status, body) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["message"], "Blog deleted");

    let (status, _) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn projects_have_their_own_fields_and_ids() {
    let app = app();
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/projects",
            json!({
                "title": "Site",
                "content": "About",
                "abstract": "Short",
                "isGroup": true,
                "githubLink": "https://github.com/example/site",
                "projectLink": ""
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Project created");
    let data = &body["data"];
    assert_eq!(data["isGroup"], json!(true));
    assert_eq!(data["abstract"], "Short");
    assert_eq!(data["projectLink"], Value::Null);
    assert_eq!(data["documentationLink"], Value::Null);

    let (status, body) = send(
        &app,
        json_request("POST", "/projects", json!({"title": "x", "content": "y", "githubLink": "not a url"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "githubLink");

    // Project ids are not visible through the blog collection.
    let (_, blogs) = send(&app, empty_request("GET", "/blogs")).await;
    assert_eq!(blogs["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn upload_stores_image_and_lists_it() {
    let app = app();
    let (status, body) = send(&app, multipart_request("image", "image/png", b"\x89PNG fake")).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let filename = body["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".png"));
    assert!(body["data"]["url"].as_str().unwrap().ends_with(&filename));

    let (status, body) = send(&app, empty_request("GET", "/upload")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![filename.as_str()]);

    let uri = format!("/upload/{}", filename);
    let (status, body) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image deleted");

    let (status, _) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = app();
    let payload = vec![0u8; 10 * 1024 * 1024];
    let (status, body) = send(&app, multipart_request("image", "image/jpeg", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("too large"));

    let (_, body) = send(&app, empty_request("GET", "/upload")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn upload_rejects_other_types_and_missing_field() {
    let app = app();
    let (status, body) = send(&app, multipart_request("image", "application/pdf", b"%PDF")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unsupported file type"));

    let (status, body) = send(&app, multipart_request("file", "image/png", b"png")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn delete_upload_rejects_path_like_names() {
    let app = app();
    let (status, _) = send(&app, empty_request("DELETE", "/upload/..%2Fsecret.png")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_uses_envelope() {
    let app = app();
    let (status, body) = send(&app, empty_request("GET", "/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], "Route GET /nope not found");
}

#[tokio::test]
async fn draft_create_rejects_publish_time() {
    let app = app();
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/blogs",
            json!({"title": "A", "content": "B", "publishedAt": "2024-01-02T03:04:05Z"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "publishedAt");

    let (_, body) = send(&app, empty_request("GET", "/blogs")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn wrong_method_uses_envelope() {
    let app = app();
    for (method, uri) in [
        ("PATCH", "/blogs/1"),
        ("DELETE", "/projects"),
        ("PUT", "/upload"),
        ("GET", "/upload/a.png"),
        ("POST", "/health"),
    ] {
        let (status, body) = send(&app, empty_request(method, uri)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["data"], Value::Null);
        assert_eq!(
            body["error"],
            format!("Method {} not allowed on {}", method, uri)
        );
    }
}

#[tokio::test]
async fn undecodable_path_segments_are_validation_errors() {
    let app = app();
    let (status, body) = send(&app, empty_request("GET", "/blogs/%FF")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"][0]["field"], "id");

    let (status, body) = send(&app, empty_request("DELETE", "/upload/%FF")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "filename");
}

/// Entity store whose every call fails with a message that must stay server-side.
struct UnreachableStore;

const STORE_FAILURE: &str = "connection refused to db.internal:5432";

#[async_trait::async_trait]
impl EntityStore for UnreachableStore {
    async fn list(&self, _: &dyn ContentModel, _: Option<Status>) -> anyhow::Result<Vec<Record>> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn get(&self, _: &dyn ContentModel, _: i64) -> anyhow::Result<Option<Record>> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn insert(&self, _: &dyn ContentModel, _: &NewRecord) -> anyhow::Result<Record> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn update(
        &self,
        _: &dyn ContentModel,
        _: i64,
        _: &RecordChanges,
    ) -> anyhow::Result<Option<Record>> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn delete(&self, _: &dyn ContentModel, _: i64) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(STORE_FAILURE))
    }
}

#[tokio::test]
async fn storage_failures_are_generic_500s() {
    let app = create_router(AppState::new(
        Arc::new(UnreachableStore),
        Arc::new(MemoryObjectStore::default()),
    ));

    let requests = vec![
        empty_request("GET", "/blogs"),
        empty_request("GET", "/blogs/1"),
        json_request("POST", "/projects", json!({"title": "A", "content": "B"})),
        json_request("PUT", "/blogs/1", json!({"title": "X"})),
        empty_request("DELETE", "/blogs/1"),
    ];
    for request in requests {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"success": false, "data": null, "error": "Internal server error"})
        );
        assert!(!body.to_string().contains("db.internal"));
    }

    let (status, body) = send(&app, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], json!(false));
    assert!(!body.to_string().contains("db.internal"));
}

async fn boom() -> &'static str {
    panic!("secret detail")
}

#[tokio::test]
async fn panicking_handler_returns_envelope() {
    let app = Router::new()
        .route(
            "/boom",
            get(boom),
        )
        .layer(CatchPanicLayer::custom(panic_response));

    let (status, body) = send(&app, empty_request("GET", "/boom")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "data": null, "error": "Internal server error"})
    );
}
