//! Post resource handlers.

use actix_web::{HttpResponse, web};

use posts_core::domain::{NewPost, Post, PostChanges};
use posts_shared::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        name: post.name,
        created_date: post.created_date,
        last_modified_date: post.last_modified_date,
        created_by_user: post.created_by_user,
        last_modified_by_user: post.last_modified_by_user,
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Not found ID: {}", id))
}

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .insert(NewPost::new(req.name, identity.subject))
        .await?;
    tracing::info!(post_id = %post.id, user = %post.created_by_user, "Post created");

    Ok(HttpResponse::Created().json(to_response(post)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// PUT /api/posts/{id}
///
/// Patches the supplied fields only; creation fields are preserved. The id is
/// resolved before the body is parsed, so an unknown id answers 404.
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if state.posts.find_by_id(&id).await?.is_none() {
        return Err(not_found(&id));
    }
    let req: UpdatePostRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let post = state
        .posts
        .update(&id, PostChanges::new(req.name, identity.subject))
        .await?
        .ok_or_else(|| not_found(&id))?;
    tracing::info!(post_id = %post.id, user = %post.last_modified_by_user, "Post updated");

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// DELETE /api/posts/{id}
///
/// Idempotent: deleting an unknown id also answers 204.
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if state.posts.delete_by_id(&id).await? {
        tracing::info!(post_id = %id, "Post deleted");
    } else {
        tracing::debug!(post_id = %id, "Delete of unknown post");
    }

    Ok(HttpResponse::NoContent().finish())
}
