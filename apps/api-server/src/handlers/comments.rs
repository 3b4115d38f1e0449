//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_shared::dto::CommentRequest;

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{post_id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let view = state
        .blog
        .add_comment(
            identity.user_id,
            path.into_inner(),
            views::comment_input(body.into_inner()),
        )
        .await?;

    Ok(HttpResponse::Created().json(views::comment(view)))
}

/// PUT /api/posts/{post_id}/comments/{comment_id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let access = state
        .blog
        .update_comment(
            identity.user_id,
            post_id,
            comment_id,
            views::comment_input(body.into_inner()),
        )
        .await?;

    Ok(views::respond(access, |view| {
        HttpResponse::Ok().json(views::comment(view))
    }))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let access = state
        .blog
        .delete_comment(identity.user_id, post_id, comment_id)
        .await?;

    Ok(views::respond(access, |()| HttpResponse::NoContent().finish()))
}
