//! Conversions between domain read models and wire DTOs.

use actix_web::{HttpResponse, http::header};

use blogicum_core::domain::{AuthorRef, CommentView, Page, PostListing, User};
use blogicum_core::service::{CommentInput, PostInput};
use blogicum_core::{Access, RedirectTarget};
use blogicum_shared::dto::{
    AuthorResponse, CategorySummary, CommentRequest, CommentResponse, LocationSummary,
    PageResponse, PostRequest, PostResponse, UserResponse,
};

pub fn post_input(req: PostRequest) -> PostInput {
    PostInput {
        title: req.title,
        text: req.text,
        pub_date: req.pub_date,
        category_id: req.category_id,
        location_id: req.location_id,
        image: req.image,
        is_published: req.is_published,
    }
}

pub fn comment_input(req: CommentRequest) -> CommentInput {
    CommentInput { text: req.text }
}

fn author(author: AuthorRef) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        username: author.username,
    }
}

pub fn user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        created_at: user.created_at,
    }
}

pub fn post(listing: PostListing) -> PostResponse {
    let PostListing {
        post,
        author: post_author,
        category,
        location,
        comment_count,
    } = listing;

    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        image: post.image,
        author: author(post_author),
        category: category.map(|c| CategorySummary {
            id: c.id,
            title: c.title,
            slug: c.slug,
        }),
        location: location.map(|l| LocationSummary {
            id: l.id,
            name: l.name,
        }),
        comment_count,
        created_at: post.created_at,
    }
}

pub fn comment(view: CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id,
        post_id: view.comment.post_id,
        text: view.comment.text,
        author: author(view.author),
        created_at: view.comment.created_at,
    }
}

pub fn page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let page = page.map(f);
    PageResponse {
        items: page.items,
        page: page.page,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }
}

/// Path of the read-only view a denied caller is sent to.
pub fn location_of(target: &RedirectTarget) -> String {
    match target {
        RedirectTarget::Index => "/api/posts".to_string(),
        RedirectTarget::PostDetail(post_id) => format!("/api/posts/{post_id}"),
    }
}

/// `302 Found` towards the redirect target, or the granted response.
pub fn respond<T>(access: Access<T>, granted: impl FnOnce(T) -> HttpResponse) -> HttpResponse {
    match access {
        Access::Granted(value) => granted(value),
        Access::Redirect(target) => HttpResponse::Found()
            .insert_header((header::LOCATION, location_of(&target)))
            .finish(),
    }
}
