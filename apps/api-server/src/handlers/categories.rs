//! Category page.

use actix_web::{HttpResponse, web};

use blogicum_shared::dto::{CategoryPostsResponse, CategoryResponse, PageQuery};

use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories/{slug}/posts
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.blog.category_posts(&path, query.page).await?;
    let category = page.category;

    Ok(HttpResponse::Ok().json(CategoryPostsResponse {
        category: CategoryResponse {
            id: category.id,
            title: category.title,
            description: category.description,
            slug: category.slug,
        },
        posts: views::page(page.posts, views::post),
    }))
}
