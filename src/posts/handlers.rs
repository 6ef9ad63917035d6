use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    error::ApiError,
    posts::{
        dto::{
            CreatePostRequest, CreatedPost, DeletedPost, Pagination, PostData, PostList,
            UpdatePostBody,
        },
        services,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/mine", get(my_posts))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id", put(update_post).delete(delete_post))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<PostList>, ApiError> {
    services::list(&state.db, page).await.map(Json)
}

#[instrument(skip(state, user))]
pub async fn my_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<Json<PostList>, ApiError> {
    services::user_related(&state.db, &user, page).await.map(Json)
}

#[instrument(skip(state, user, body))]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<CreatedPost>), ApiError> {
    let created = services::create(&state.db, &user, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, user, body))]
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePostBody>,
) -> Result<Json<PostData>, ApiError> {
    services::update(&state.db, &user, id, body.content)
        .await
        .map(Json)
}

#[instrument(skip(state, user))]
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedPost>, ApiError> {
    services::delete(&state.db, &user, id).await.map(Json)
}
