use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::{App, http::StatusCode, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use quire_core::domain::{NewPost, Post, PostId, PostPatch};
use quire_core::error::RepoError;
use quire_core::ports::PostRepository;
use quire_infra::InMemoryPostRepository;
use quire_shared::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};

use super::configure_routes;
use crate::state::AppState;

/// In-memory repository that counts every store call.
#[derive(Default)]
struct RecordingRepository {
    inner: InMemoryPostRepository,
    calls: AtomicUsize,
}

impl RecordingRepository {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PostRepository for RecordingRepository {
    async fn create(&self, fields: NewPost) -> Result<Post, RepoError> {
        self.hit();
        self.inner.create(fields).await
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        self.hit();
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepoError> {
        self.hit();
        self.inner.find_by_id(id).await
    }

    async fn delete_by_id(&self, id: &PostId) -> Result<(), RepoError> {
        self.hit();
        self.inner.delete_by_id(id).await
    }

    async fn update_by_id(
        &self,
        id: &PostId,
        patch: PostPatch,
    ) -> Result<Option<Post>, RepoError> {
        self.hit();
        self.inner.update_by_id(id, patch).await
    }

    fn backend(&self) -> &'static str {
        "recording"
    }
}

/// Repository whose every call fails as if the server were unreachable.
struct UnreachableRepository;

#[async_trait]
impl PostRepository for UnreachableRepository {
    async fn create(&self, _fields: NewPost) -> Result<Post, RepoError> {
        Err(RepoError::Connection("server selection timeout".to_string()))
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Err(RepoError::Connection("server selection timeout".to_string()))
    }

    async fn find_by_id(&self, _id: &PostId) -> Result<Option<Post>, RepoError> {
        Err(RepoError::Connection("server selection timeout".to_string()))
    }

    async fn delete_by_id(&self, _id: &PostId) -> Result<(), RepoError> {
        Err(RepoError::Connection("server selection timeout".to_string()))
    }

    async fn update_by_id(
        &self,
        _id: &PostId,
        _patch: PostPatch,
    ) -> Result<Option<Post>, RepoError> {
        Err(RepoError::Connection("server selection timeout".to_string()))
    }

    fn backend(&self) -> &'static str {
        "unreachable"
    }
}

macro_rules! test_app {
    ($repo:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::with_repository($repo)))
                .configure(configure_routes),
        )
        .await
    };
}

fn sample_request() -> CreatePostRequest {
    CreatePostRequest {
        title: "Hello".to_string(),
        body: "First post".to_string(),
        tags: vec!["intro".to_string(), "rust".to_string()],
    }
}

const UNKNOWN_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

#[actix_web::test]
async fn test_create_returns_post_with_new_id() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(sample_request())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let first: PostResponse = test::read_body_json(resp).await;
    assert_eq!(first.title, "Hello");
    assert_eq!(first.body, "First post");
    assert_eq!(first.tags, vec!["intro", "rust"]);
    assert!(PostId::parse(&first.id).is_ok());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(sample_request())
        .to_request();
    let second: PostResponse = test::call_and_read_body_json(&app, req).await;
    assert_ne!(first.id, second.id);
}

#[actix_web::test]
async fn test_create_rejects_missing_fields() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    for missing in ["title", "body", "tags"] {
        let mut payload = serde_json::to_value(sample_request()).unwrap();
        payload.as_object_mut().unwrap().remove(missing);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "missing {missing}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["details"][0]["type"], "any.required");
        assert_eq!(body["details"][0]["path"], json!([missing]));
    }
}

#[actix_web::test]
async fn test_create_rejects_non_string_tag() {
    let repo = Arc::new(RecordingRepository::default());
    let app = test_app!(repo.clone());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": "t", "body": "b", "tags": ["ok", 42] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"][0]["type"], "string.base");
    assert_eq!(body["details"][0]["path"], json!(["tags", 1]));
    assert_eq!(repo.calls(), 0);
}

#[actix_web::test]
async fn test_create_rejects_malformed_json() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"title\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_create_rejects_oversized_body() {
    let repo = Arc::new(RecordingRepository::default());
    let app = test_app!(repo.clone());

    let payload = serde_json::to_vec(&json!({
        "title": "big",
        "body": "x".repeat(3 * 1024 * 1024),
        "tags": [],
    }))
    .unwrap();
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("content-type", "application/json"))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(repo.calls(), 0);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 413);
}

#[actix_web::test]
async fn test_create_then_read_round_trips() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(sample_request())
        .to_request();
    let created: PostResponse = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let read: PostResponse = test::read_body_json(resp).await;
    assert_eq!(read, created);
}

#[actix_web::test]
async fn test_list_empty_and_populated() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(sample_request())
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let posts: Vec<PostResponse> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(posts.len(), 2);
}

#[actix_web::test]
async fn test_read_unknown_id_is_not_found() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{UNKNOWN_ID}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_web::test]
async fn test_delete_then_read_is_not_found() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(sample_request())
        .to_request();
    let created: PostResponse = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/posts/{}", created.id);

    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Deleting again still answers 204.
    let req = test::TestRequest::delete().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_update_title_only() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(sample_request())
        .to_request();
    let created: PostResponse = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/posts/{}", created.id);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(UpdatePostRequest {
            title: Some("Renamed".to_string()),
            ..Default::default()
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: PostResponse = test::read_body_json(resp).await;
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.body, created.body);
    assert_eq!(updated.tags, created.tags);
    assert_eq!(updated.id, created.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let read: PostResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(read, updated);
}

#[actix_web::test]
async fn test_update_rejects_bad_shape() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{UNKNOWN_ID}"))
        .set_json(json!({ "tags": "not-an-array" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"][0]["type"], "array.base");
}

#[actix_web::test]
async fn test_update_unknown_id_is_not_found() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{UNKNOWN_ID}"))
        .set_json(json!({ "body": "changed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_web::test]
async fn test_malformed_id_never_reaches_store() {
    let repo = Arc::new(RecordingRepository::default());
    let app = test_app!(repo.clone());

    for bad in ["123", "zzzzzzzzzzzzzzzzzzzzzzzz", "65a1f0c2e4b0a1b2c3d4e5f6aa"] {
        let uri = format!("/api/posts/{bad}");

        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "GET {bad}");
        assert!(test::read_body(resp).await.is_empty());

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "DELETE {bad}");

        let req = test::TestRequest::patch()
            .uri(&uri)
            .set_json(json!({ "title": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "PATCH {bad}");
        assert!(test::read_body(resp).await.is_empty());
    }

    assert_eq!(repo.calls(), 0);
}

#[actix_web::test]
async fn test_store_failure_is_internal_error() {
    let app = test_app!(Arc::new(UnreachableRepository));

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 500);
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("server selection timeout")
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{UNKNOWN_ID}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let app = test_app!(Arc::new(InMemoryPostRepository::new()));

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}
