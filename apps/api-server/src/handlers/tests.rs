use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Post, User};
use blogicum_core::ports::{BaseRepository, PasswordService, TokenService, UserRepository};
use blogicum_core::service::Repositories;
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use crate::state::AppState;

struct Ctx {
    repos: Repositories,
    state: web::Data<AppState>,
    tokens: web::Data<Arc<dyn TokenService>>,
    passwords: web::Data<Arc<dyn PasswordService>>,
}

impl Ctx {
    fn new() -> Self {
        let repos = InMemoryStore::new().repositories();
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig::default()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::default());

        Self {
            state: web::Data::new(AppState::with_repositories(repos.clone(), 10)),
            repos,
            tokens: web::Data::new(tokens),
            passwords: web::Data::new(passwords),
        }
    }

    /// A stored user and the `Authorization` header value for them.
    async fn user(&self, username: &str) -> (User, String) {
        let user = self
            .repos
            .users
            .create(User::new(
                username.to_string(),
                format!("{username}@example.com"),
                "not-a-real-hash".to_string(),
            ))
            .await
            .unwrap();
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();

        (user, format!("Bearer {token}"))
    }

    async fn post(&self, author: &User, title: &str, published: bool) -> Post {
        let mut post = Post::new(
            author.id,
            title.to_string(),
            "text".to_string(),
            Utc::now() - TimeDelta::hours(1),
        );
        post.is_published = published;
        self.repos.posts.create(post).await.unwrap()
    }
}

macro_rules! app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data($ctx.state.clone())
                .app_data($ctx.tokens.clone())
                .app_data($ctx.passwords.clone())
                .configure(super::configure_routes),
        )
        .await
    };
}

fn location(res: &actix_web::dev::ServiceResponse) -> &str {
    res.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[actix_web::test]
async fn test_index_lists_only_public_posts() {
    let ctx = Ctx::new();
    let (alice, _) = ctx.user("alice").await;
    ctx.post(&alice, "public", true).await;
    ctx.post(&alice, "draft", false).await;
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["title"], "public");
    assert_eq!(body["items"][0]["author"]["username"], "alice");
    assert_eq!(body["items"][0]["comment_count"], 0);
}

#[actix_web::test]
async fn test_create_post_requires_token() {
    let ctx = Ctx::new();
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"title": "Hello", "text": "World"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_post_answers_created_with_location() {
    let ctx = Ctx::new();
    let (_, auth) = ctx.user("alice").await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, auth))
        .set_json(json!({"title": "Hello", "text": "World"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let expected_location = location(&res).to_string();
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        expected_location,
        format!("/api/posts/{}", body["id"].as_str().unwrap())
    );
    assert_eq!(body["author"]["username"], "alice");
    assert_eq!(body["is_published"], true);
}

#[actix_web::test]
async fn test_empty_title_is_bad_request() {
    let ctx = Ctx::new();
    let (_, auth) = ctx.user("alice").await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, auth))
        .set_json(json!({"title": "  ", "text": "World"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_non_owner_edit_redirects_to_post() {
    let ctx = Ctx::new();
    let (alice, _) = ctx.user("alice").await;
    let (_, bob_auth) = ctx.user("bob").await;
    let post = ctx.post(&alice, "original", true).await;
    let app = app!(ctx);

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header((header::AUTHORIZATION, bob_auth))
        .set_json(json!({"title": "hijacked", "text": "x"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/api/posts/{}", post.id));

    let stored = ctx.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "original");
}

#[actix_web::test]
async fn test_non_owner_delete_redirects_to_index() {
    let ctx = Ctx::new();
    let (alice, _) = ctx.user("alice").await;
    let (_, bob_auth) = ctx.user("bob").await;
    let post = ctx.post(&alice, "keep me", true).await;
    let app = app!(ctx);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header((header::AUTHORIZATION, bob_auth))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/api/posts");
    assert!(ctx.repos.posts.find_by_id(post.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn test_owner_deletes_post() {
    let ctx = Ctx::new();
    let (alice, auth) = ctx.user("alice").await;
    let post = ctx.post(&alice, "bye", true).await;
    let app = app!(ctx);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(ctx.repos.posts.find_by_id(post.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_missing_post_is_not_found() {
    let ctx = Ctx::new();
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", Uuid::new_v4()))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
}

#[actix_web::test]
async fn test_draft_is_visible_to_its_author_only() {
    let ctx = Ctx::new();
    let (alice, auth) = ctx.user("alice").await;
    let draft = ctx.post(&alice, "draft", false).await;
    let app = app!(ctx);
    let uri = format!("/api/posts/{}", draft.id);

    let anonymous = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(
        test::call_service(&app, anonymous).await.status(),
        StatusCode::NOT_FOUND
    );

    let author = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, author).await;
    assert_eq!(body["post"]["title"], "draft");
    assert_eq!(body["comments"], json!([]));
}

#[actix_web::test]
async fn test_non_owner_comment_edit_redirects_to_post() {
    let ctx = Ctx::new();
    let (alice, _) = ctx.user("alice").await;
    let (_, bob_auth) = ctx.user("bob").await;
    let post = ctx.post(&alice, "post", true).await;
    let comment = ctx
        .repos
        .comments
        .create(Comment::new(post.id, alice.id, "first".to_string()))
        .await
        .unwrap();
    let app = app!(ctx);

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}/comments/{}", post.id, comment.id))
        .insert_header((header::AUTHORIZATION, bob_auth))
        .set_json(json!({"text": "edited"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/api/posts/{}", post.id));
}

#[actix_web::test]
async fn test_comment_shows_up_in_counts() {
    let ctx = Ctx::new();
    let (alice, _) = ctx.user("alice").await;
    let (_, bob_auth) = ctx.user("bob").await;
    let post = ctx.post(&alice, "post", true).await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", post.id))
        .insert_header((header::AUTHORIZATION, bob_auth))
        .set_json(json!({"text": "nice"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"][0]["comment_count"], 1);
}

#[actix_web::test]
async fn test_profile_shows_drafts_to_owner() {
    let ctx = Ctx::new();
    let (alice, auth) = ctx.user("alice").await;
    ctx.post(&alice, "public", true).await;
    ctx.post(&alice, "draft", false).await;
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/api/profile/alice").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["profile"]["username"], "alice");
    assert_eq!(body["posts"]["total_items"], 1);

    let req = test::TestRequest::get()
        .uri("/api/profile/alice")
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"]["total_items"], 2);
}

#[actix_web::test]
async fn test_hidden_category_is_not_found() {
    let ctx = Ctx::new();
    let mut category = Category::new(
        "Archive".to_string(),
        "Old stuff".to_string(),
        "archive".to_string(),
    );
    category.is_published = false;
    ctx.repos.categories.create(category).await.unwrap();
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/categories/archive/posts")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let ctx = Ctx::new();
    let app = app!(ctx);
    let credentials = json!({
        "username": "carol",
        "email": "carol@example.com",
        "password": "correct-horse",
    });

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&credentials)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&credentials)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": "carol", "password": "wrong-password"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": "carol", "password": "correct-horse"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["access_token"].as_str().unwrap();
    assert_eq!(body["token_type"], "Bearer");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["username"], "carol");
}

#[actix_web::test]
async fn test_malformed_json_is_problem_details() {
    let ctx = Ctx::new();
    let (_, auth) = ctx.user("alice").await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, auth))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_comment_delete_is_reserved_to_its_author() {
    let ctx = Ctx::new();
    let (alice, alice_auth) = ctx.user("alice").await;
    let (_, bob_auth) = ctx.user("bob").await;
    let post = ctx.post(&alice, "post", true).await;
    let comment = ctx
        .repos
        .comments
        .create(Comment::new(post.id, alice.id, "mine".to_string()))
        .await
        .unwrap();
    let app = app!(ctx);
    let uri = format!("/api/posts/{}/comments/{}", post.id, comment.id);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, bob_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/api/posts/{}", post.id));
    assert!(
        ctx.repos
            .comments
            .find_by_id(comment.id)
            .await
            .unwrap()
            .is_some()
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, alice_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(
        ctx.repos
            .comments
            .find_by_id(comment.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[actix_web::test]
async fn test_overlong_username_is_bad_request() {
    let ctx = Ctx::new();
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "a".repeat(151),
            "email": "long@example.com",
            "password": "correct-horse",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.repos.users.find_by_email("long@example.com").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_login_trims_username_like_register() {
    let ctx = Ctx::new();
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": " dave ",
            "email": "dave@example.com",
            "password": "correct-horse",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": " dave ", "password": "correct-horse"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
