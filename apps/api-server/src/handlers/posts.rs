//! Post resource handlers.

use actix_web::{HttpResponse, web};
use serde_json::Value;

use quire_core::domain::Post;
use quire_core::validation;
use quire_shared::dto::PostResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::post_id::ValidPostId;
use crate::state::AppState;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        title: post.title,
        body: post.body,
        tags: post.tags,
        published_date: post.published_date,
    }
}

/// POST /api/posts
pub async fn write(state: web::Data<AppState>, body: web::Json<Value>) -> AppResult<HttpResponse> {
    let fields = validation::new_post(&body)?;

    let post = state.posts.create(fields).await?;
    tracing::info!(post_id = %post.id, "Post created");

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all().await?;

    Ok(HttpResponse::Ok().json(posts.into_iter().map(to_response).collect::<Vec<_>>()))
}

/// GET /api/posts/{id}
pub async fn read(id: ValidPostId, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(&id.0)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// DELETE /api/posts/{id}
///
/// Answers 204 whether or not a post matched.
pub async fn remove(id: ValidPostId, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    state.posts.delete_by_id(&id.0).await?;
    tracing::info!(post_id = %id.0, "Post removed");

    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /api/posts/{id}
pub async fn update(
    id: ValidPostId,
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let patch = validation::post_patch(&body)?;

    let post = state
        .posts
        .update_by_id(&id.0, patch)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(post_id = %post.id, "Post updated");

    Ok(HttpResponse::Ok().json(to_response(post)))
}
