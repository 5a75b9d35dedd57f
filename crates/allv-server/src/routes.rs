use crate::state::AppState;
use allv_analytics::aggregations::{aggregate_daily, aggregate_daily_by_series};
use allv_analytics::charts::{PostsOverTime, StackedActivity};
use allv_core::error::AllvError;
use allv_core::types::{Post, PostInput, User, UserInput, UserSummary};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::json;

/// Maps domain errors onto HTTP responses.
pub struct ApiError(AllvError);

impl From<AllvError> for ApiError {
    fn from(err: AllvError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            AllvError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "ok": false, "errors": errors })),
            )
                .into_response(),
            err @ AllvError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
                .into_response(),
            err => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "ok": false, "error": err.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── Users ───────────────────────────────────────────────────────────────

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[derive(Debug, Serialize)]
struct UserMutation {
    ok: bool,
    user: User,
}

#[derive(Debug, Serialize)]
struct UserDetail {
    user: User,
    posts: Vec<Post>,
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<UserSummary>> {
    let directory = state.directory.read().await;
    Json(directory.list_users())
}

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> ApiResult<impl IntoResponse> {
    let mut directory = state.directory.write().await;
    let user = directory.create_user_async(&input).await?;
    Ok((StatusCode::CREATED, Json(UserMutation { ok: true, user })))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserDetail>> {
    let directory = state.directory.read().await;
    let user = directory
        .get_user(&id)
        .cloned()
        .ok_or_else(|| AllvError::user_not_found(&id))?;
    let posts = directory.list_posts_for(&id)?;
    Ok(Json(UserDetail { user, posts }))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UserInput>,
) -> ApiResult<Json<UserMutation>> {
    let mut directory = state.directory.write().await;
    let user = directory.update_user_async(&id, &input).await?;
    Ok(Json(UserMutation { ok: true, user }))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut directory = state.directory.write().await;
    directory.delete_user_async(&id).await?;
    Ok(Json(json!({ "ok": true })))
}

// ── Posts ───────────────────────────────────────────────────────────────

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/{id}/posts", get(list_posts).post(create_post))
        .route(
            "/api/users/{id}/posts/{post_id}",
            axum::routing::put(update_post).delete(delete_post),
        )
}

#[derive(Debug, Serialize)]
struct PostMutation {
    ok: bool,
    post: Post,
}

async fn list_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    let directory = state.directory.read().await;
    Ok(Json(directory.list_posts_for(&id)?))
}

async fn create_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PostInput>,
) -> ApiResult<impl IntoResponse> {
    let mut directory = state.directory.write().await;
    let post = directory.create_post_async(&id, &input).await?;
    Ok((StatusCode::CREATED, Json(PostMutation { ok: true, post })))
}

async fn update_post(
    State(state): State<AppState>,
    Path((id, post_id)): Path<(String, String)>,
    Json(input): Json<PostInput>,
) -> ApiResult<Json<PostMutation>> {
    let mut directory = state.directory.write().await;
    let post = directory.update_post_async(&id, &post_id, &input).await?;
    Ok(Json(PostMutation { ok: true, post }))
}

async fn delete_post(
    State(state): State<AppState>,
    Path((id, post_id)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut directory = state.directory.write().await;
    directory.delete_post_async(&id, &post_id).await?;
    Ok(Json(json!({ "ok": true })))
}

// ── Charts ──────────────────────────────────────────────────────────────

pub fn chart_routes() -> Router<AppState> {
    Router::new()
        .route("/api/charts/posts-over-time", get(posts_over_time))
        .route("/api/charts/posts-by-author", get(posts_by_author))
}

async fn posts_over_time(State(state): State<AppState>) -> Json<PostsOverTime> {
    let timestamps = state.directory.read().await.post_timestamps();
    let activity = aggregate_daily(timestamps);
    Json(PostsOverTime::from_activity(
        &activity,
        state.config.charts.max_ticks,
    ))
}

async fn posts_by_author(State(state): State<AppState>) -> Json<StackedActivity> {
    let (events, names) = {
        let directory = state.directory.read().await;
        (directory.post_timestamps_by_author(), directory.author_names())
    };
    let activity = aggregate_daily_by_series(events).with_labels(&names);
    Json(StackedActivity::from_series(
        &activity,
        state.config.charts.max_ticks,
    ))
}
