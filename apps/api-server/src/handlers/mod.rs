//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod posts;
mod profile;
mod views;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::AppError;

/// Malformed JSON bodies answer with a problem-details 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{post_id}", web::get().to(posts::detail))
                    .route("/{post_id}", web::put().to(posts::update))
                    .route("/{post_id}", web::delete().to(posts::delete))
                    .route("/{post_id}/comments", web::post().to(comments::create))
                    .route(
                        "/{post_id}/comments/{comment_id}",
                        web::put().to(comments::update),
                    )
                    .route(
                        "/{post_id}/comments/{comment_id}",
                        web::delete().to(comments::delete),
                    ),
            )
            .route(
                "/categories/{slug}/posts",
                web::get().to(categories::posts),
            )
            .route("/profile/{username}", web::get().to(profile::show)),
    );
}
