//! Post handlers.

use actix_web::{HttpResponse, http::header, web};
use uuid::Uuid;

use blogicum_shared::dto::{PageQuery, PostDetailResponse, PostRequest};

use super::views;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.blog.index(query.page).await?;
    Ok(HttpResponse::Ok().json(views::page(page, views::post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    tracing::debug!(username = %identity.username, "Creating post");
    let listing = state
        .blog
        .create_post(identity.user_id, views::post_input(body.into_inner()))
        .await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/posts/{}", listing.post.id)))
        .json(views::post(listing)))
}

/// GET /api/posts/{post_id}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state
        .blog
        .post_detail(identity.user_id(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: views::post(detail.post),
        comments: detail.comments.into_iter().map(views::comment).collect(),
    }))
}

/// PUT /api/posts/{post_id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let access = state
        .blog
        .update_post(
            identity.user_id,
            path.into_inner(),
            views::post_input(body.into_inner()),
        )
        .await?;

    Ok(views::respond(access, |listing| {
        HttpResponse::Ok().json(views::post(listing))
    }))
}

/// DELETE /api/posts/{post_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let access = state
        .blog
        .delete_post(identity.user_id, path.into_inner())
        .await?;

    Ok(views::respond(access, |()| HttpResponse::NoContent().finish()))
}
