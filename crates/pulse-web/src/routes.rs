//! HTTP routes for the analytics API.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use pulse_core::{NewComment, NewLike, NewPost, NewUser};
use pulse_engine::AnalyticsEngine;

use crate::error::ApiError;

/// Default limit for the top-posts view.
const DEFAULT_TOP_POSTS_LIMIT: usize = 10;
/// Default limit for the activity timeline.
const DEFAULT_TIMELINE_LIMIT: usize = 20;

/// Shared state for the API server.
pub struct AppState {
    pub engine: Arc<AnalyticsEngine>,
}

/// Create the API router.
///
/// CORS is fully permissive: the dashboard frontend is served from a
/// different origin in every deployment we have.
pub fn create_router(engine: Arc<AnalyticsEngine>) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/posts", post(create_post).get(list_posts))
        .route("/likes", post(create_like).delete(remove_like))
        .route("/comments", post(create_comment))
        .route("/analytics/top-posts", get(top_posts))
        .route("/analytics/user-summary", get(user_summary))
        .route("/analytics/engagement-stats", get(engagement_stats))
        .route("/analytics/union-activities", get(union_activities))
        .route("/analytics/group-by-engagement", get(group_by_engagement))
        .route("/analytics/search-posts", get(search_posts))
        .route("/analytics/refresh-materialized", post(refresh_materialized))
        .route("/analytics/export-report", get(export_report))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.engine.store().create_user(new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.store().list_users().await)
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.engine.store().get_user(id).await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    state.engine.store().delete_user(id).await?;
    Ok(Json(json!({ "message": "user deleted" })))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPost>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.engine.store().create_post(new).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn list_posts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.store().list_posts().await)
}

async fn create_like(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewLike>,
) -> Result<impl IntoResponse, ApiError> {
    let like = state.engine.store().create_like(new).await?;
    Ok((StatusCode::CREATED, Json(like)))
}

async fn remove_like(
    State(state): State<Arc<AppState>>,
    Json(like): Json<NewLike>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .engine
        .store()
        .remove_like(like.post_id, like.user_id)
        .await?;
    Ok(Json(json!({ "message": "like removed" })))
}

async fn create_comment(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewComment>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state.engine.store().create_comment(new).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn top_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_POSTS_LIMIT);
    Json(state.engine.top_posts(limit).await)
}

async fn user_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.user_summary().await)
}

async fn engagement_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.engagement_stats().await)
}

async fn union_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_TIMELINE_LIMIT);
    Json(state.engine.union_activities(limit).await)
}

#[derive(Deserialize)]
struct GroupQuery {
    min_posts: Option<u64>,
}

async fn group_by_engagement(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GroupQuery>,
) -> impl IntoResponse {
    Json(
        state
            .engine
            .grouped_engagement(params.min_posts.unwrap_or(1))
            .await,
    )
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    query: String,
}

async fn search_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hits = state.engine.search_posts(&params.query).await?;
    Ok(Json(hits))
}

async fn refresh_materialized(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let snapshot = state.engine.refresh().await;
    Json(json!({
        "message": "materialized views refreshed",
        "refreshed_at": snapshot.refreshed_at,
    }))
}

async fn export_report(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let csv = state.engine.export_report().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"engagement_report.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.engine.store().view().await;
    Json(json!({
        "status": "ok",
        "users": view.user_count(),
        "posts": view.post_count(),
        "likes": view.like_count(),
        "comments": view.comment_count(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use pulse_core::{EngineConfig, EntityStore, ScoreWeights};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let store = Arc::new(EntityStore::new(ScoreWeights::default()));
        let engine = Arc::new(AnalyticsEngine::new(store, EngineConfig::default()));
        create_router(engine)
    }

    async fn send_json(router: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn send_get(router: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn create_user_returns_201_with_record() {
        let router = test_router();
        let (status, body) = send_json(
            &router,
            "POST",
            "/users",
            json!({"username": "alice", "email": "alice@example.com", "full_name": "Alice"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["total_likes_received"], 0);
    }

    #[tokio::test]
    async fn malformed_email_is_a_400_with_reason() {
        let router = test_router();
        let (status, body) = send_json(
            &router,
            "POST",
            "/users",
            json!({"username": "alice", "email": "nope", "full_name": "Alice"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("email"));
    }

    #[tokio::test]
    async fn dangling_references_are_404() {
        let router = test_router();
        let (status, _) = send_json(
            &router,
            "POST",
            "/posts",
            json!({"user_id": 42, "content": "hello"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send_get(&router, "/users/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_like_is_a_409() {
        let router = test_router();
        send_json(
            &router,
            "POST",
            "/users",
            json!({"username": "alice", "email": "alice@example.com", "full_name": "Alice"}),
        )
        .await;
        send_json(
            &router,
            "POST",
            "/users",
            json!({"username": "bob", "email": "bob@example.com", "full_name": "Bob"}),
        )
        .await;
        send_json(
            &router,
            "POST",
            "/posts",
            json!({"user_id": 1, "content": "hello"}),
        )
        .await;

        let like = json!({"post_id": 1, "user_id": 2});
        let (status, _) = send_json(&router, "POST", "/likes", like.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send_json(&router, "POST", "/likes", like).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn empty_search_query_is_a_400() {
        let router = test_router();
        let (status, body) = send_get(&router, "/analytics/search-posts?query=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("query"));
    }

    #[tokio::test]
    async fn analytics_round_trip_through_the_api() {
        let router = test_router();
        for (name, email) in [("alice", "alice@example.com"), ("bob", "bob@example.com")] {
            send_json(
                &router,
                "POST",
                "/users",
                json!({"username": name, "email": email, "full_name": name}),
            )
            .await;
        }
        send_json(
            &router,
            "POST",
            "/posts",
            json!({"user_id": 1, "content": "Hello world"}),
        )
        .await;
        send_json(
            &router,
            "POST",
            "/likes",
            json!({"post_id": 1, "user_id": 2}),
        )
        .await;
        send_json(
            &router,
            "POST",
            "/comments",
            json!({"post_id": 1, "user_id": 2, "content": "nice"}),
        )
        .await;

        let (status, body) = send_get(&router, "/analytics/top-posts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["rank"], 1);
        assert_eq!(body[0]["engagement_score"], 3.0);

        let (status, body) = send_get(&router, "/analytics/union-activities").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (status, body) = send_get(&router, "/analytics/engagement-stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall_stats"]["total_likes"], 1);
        assert_eq!(body["top_engaged_users"][0]["username"], "alice");

        let (status, body) =
            send_json(&router, "POST", "/analytics/refresh-materialized", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["refreshed_at"].is_string());
    }

    #[tokio::test]
    async fn export_is_csv_with_attachment_headers() {
        let router = test_router();
        let request = Request::builder()
            .uri("/analytics/export-report")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );
        assert!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap()
                .to_str()
                .unwrap()
                .contains("engagement_report.csv")
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("rank,post_id,username,"));
    }

    #[tokio::test]
    async fn delete_user_with_posts_is_a_409() {
        let router = test_router();
        send_json(
            &router,
            "POST",
            "/users",
            json!({"username": "alice", "email": "alice@example.com", "full_name": "Alice"}),
        )
        .await;
        send_json(
            &router,
            "POST",
            "/posts",
            json!({"user_id": 1, "content": "hello"}),
        )
        .await;

        let request = Request::builder()
            .method("DELETE")
            .uri("/users/1")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
