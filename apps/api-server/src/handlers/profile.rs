//! Author profile page.

use actix_web::{HttpResponse, web};

use blogicum_shared::dto::{PageQuery, ProfileResponse};

use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/profile/{username}
///
/// The profile owner also sees their drafts and scheduled posts.
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .blog
        .profile(identity.user_id(), &path, query.page)
        .await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        profile: views::user(&page.profile),
        posts: views::page(page.posts, views::post),
    }))
}
