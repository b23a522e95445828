//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET, API_PORT
//!
//! Run with: cargo test -p integration-tests --test api_tests

use futures::future::join_all;
use integration_tests::{
    assert_error, assert_json, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use share_core::Snowflake;

struct Scene {
    server: TestServer,
    owner: Snowflake,
    owner_token: String,
    category: Snowflake,
}

impl Scene {
    async fn new() -> Self {
        let server = TestServer::start().await.expect("Failed to start server");
        let pool = server.pool().unwrap();
        let owner = seed_user(pool).await.unwrap();
        let category = seed_category(pool).await.unwrap();
        let owner_token = server.token(owner).unwrap();
        Self {
            server,
            owner,
            owner_token,
            category,
        }
    }

    async fn create_content(&self) -> ContentBody {
        let response = self
            .server
            .post_auth(
                "/api/v1/contents",
                &self.owner_token,
                Some(&CreateContentRequest::published(self.category)),
            )
            .await
            .unwrap();
        let content: ContentBody = assert_json(response, StatusCode::CREATED).await.unwrap();
        assert_eq!(content.owner_id, self.owner.to_string());
        content
    }

    async fn fetch_with_cookie(&self, content_id: &str, cookie: &str) -> ContentBody {
        let response = self
            .server
            .get(&format!("/api/v1/contents/{content_id}"))
            .header("cookie", cookie)
            .send()
            .await
            .unwrap();
        assert_json(response, StatusCode::OK).await.unwrap()
    }

    async fn new_user_token(&self) -> String {
        let user = seed_user(self.server.pool().unwrap()).await.unwrap();
        self.server.token(user).unwrap()
    }

    async fn view_as_session(&self, content_id: &str, session: &str) -> ViewBody {
        let response = self
            .server
            .post(&format!("/api/v1/contents/{content_id}/views"))
            .header("x-session-id", session)
            .send()
            .await
            .unwrap();
        assert_json(response, StatusCode::OK).await.unwrap()
    }

    async fn toggle(&self, content_id: &str, token: &str) -> LikeBody {
        let response = self
            .server
            .post_auth::<()>(&format!("/api/v1/contents/{content_id}/like"), token, None)
            .await
            .unwrap();
        assert_json(response, StatusCode::OK).await.unwrap()
    }
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["database"], "healthy");
    assert_eq!(body["checks"]["redis"], "healthy");
}

// ============================================================================
// Views
// ============================================================================

#[tokio::test]
async fn test_view_counted_once_per_viewer() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;
    assert_eq!(content.view_count, 0);

    let first = scene.view_as_session(&content.id, "it-session-a").await;
    let repeat = scene.view_as_session(&content.id, "it-session-a").await;
    let other = scene.view_as_session(&content.id, "it-session-b").await;

    assert_eq!(first, ViewBody { counted: true, view_count: 1 });
    assert_eq!(repeat, ViewBody { counted: false, view_count: 1 });
    assert_eq!(other, ViewBody { counted: true, view_count: 2 });
}

#[tokio::test]
async fn test_get_content_records_view() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;

    let first = scene
        .fetch_with_cookie(&content.id, "session_id=it-cookie")
        .await;
    assert_eq!(first.view, Some(ViewBody { counted: true, view_count: 1 }));
    assert_eq!(first.view_count, 1);

    let second = scene
        .fetch_with_cookie(&content.id, "session_id=it-cookie")
        .await;
    assert_eq!(second.view.map(|v| v.counted), Some(false));
    assert_eq!(second.view_count, 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_views_count_once() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;

    let outcomes = join_all(
        (0..20).map(|_| scene.view_as_session(&content.id, "it-burst")),
    )
    .await;

    assert_eq!(outcomes.iter().filter(|o| o.counted).count(), 1);

    let response = scene
        .server
        .post_auth::<()>(
            &format!("/api/v1/contents/{}/reconcile", content.id),
            &scene.owner_token,
            None,
        )
        .await
        .unwrap();
    let report: ReconcileBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(report.view_count, 1);
    assert!(report.drift.is_none());
}

#[tokio::test]
async fn test_view_of_unknown_content() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let response = scene
        .server
        .post("/api/v1/contents/1/views")
        .header("x-session-id", "it-session")
        .send()
        .await
        .unwrap();

    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_CONTENT");
}

// ============================================================================
// Likes
// ============================================================================

#[tokio::test]
async fn test_like_toggle_sequence() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;
    let token = scene.new_user_token().await;

    let mut seen = Vec::new();
    for _ in 0..3 {
        let outcome = scene.toggle(&content.id, &token).await;
        seen.push((outcome.liked, outcome.like_count));
    }

    assert_eq!(seen, vec![(true, 1), (false, 0), (true, 1)]);
}

#[tokio::test]
async fn test_concurrent_likes_from_distinct_users() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;

    let mut tokens = Vec::new();
    for _ in 0..8 {
        tokens.push(scene.new_user_token().await);
    }

    let outcomes = join_all(tokens.iter().map(|token| scene.toggle(&content.id, token))).await;
    assert!(outcomes.iter().all(|o| o.liked));

    let response = scene
        .server
        .post_auth::<()>(
            &format!("/api/v1/contents/{}/reconcile", content.id),
            &scene.owner_token,
            None,
        )
        .await
        .unwrap();
    let report: ReconcileBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(report.like_count, 8);
    assert!(report.drift.is_none());
}

#[tokio::test]
async fn test_like_requires_auth() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;

    let response = scene
        .server
        .post(&format!("/api/v1/contents/{}/like", content.id))
        .send()
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_reconcile_repairs_drift() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;
    scene.view_as_session(&content.id, "it-drift").await;

    force_counters(scene.server.pool().unwrap(), &content.id, 40, 3)
        .await
        .unwrap();

    let path = format!("/api/v1/contents/{}/reconcile", content.id);
    let response = scene
        .server
        .post_auth::<()>(&path, &scene.owner_token, None)
        .await
        .unwrap();
    let report: ReconcileBody = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!((report.view_count, report.like_count), (1, 0));
    let drift = report.drift.expect("drift reported");
    assert_eq!((drift.view_delta, drift.like_delta), (-39, -3));

    // Second pass finds nothing to repair
    let response = scene
        .server
        .post_auth::<()>(&path, &scene.owner_token, None)
        .await
        .unwrap();
    let again: ReconcileBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(again.drift.is_none());
}

// ============================================================================
// Discovery and content lifecycle
// ============================================================================

#[tokio::test]
async fn test_discover_single_category() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;

    let path = format!("/api/v1/discover?category_id={}", scene.category);
    let response = scene.server.get(&path).send().await.unwrap();
    let selection: DiscoveryBody = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(selection.items.len(), 1);
    assert_eq!(selection.items[0].id, content.id);
    assert_eq!(selection.items[0].category_id, scene.category.to_string());

    // Cached: a second item in the same category does not appear yet
    scene.create_content().await;
    let response = scene.server.get(&path).send().await.unwrap();
    let cached: DiscoveryBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cached.generated_at, selection.generated_at);
    assert_eq!(cached.items[0].id, content.id);
}

#[tokio::test]
async fn test_delete_is_owner_only() {
    if !check_test_env() {
        return;
    }

    let scene = Scene::new().await;
    let content = scene.create_content().await;
    let path = format!("/api/v1/contents/{}", content.id);

    let stranger = scene.new_user_token().await;
    let response = scene.server.delete_auth(&path, &stranger).await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = scene
        .server
        .delete_auth(&path, &scene.owner_token)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = scene.server.get(&path).send().await.unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
}
