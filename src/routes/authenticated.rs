use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes for any identity that passed the authentication layer. Every
/// handler here receives a validated `AuthUser`; operations that are
/// further gated by ownership (blog update) or self-access (user detail)
/// defer that decision to the authorization policy.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /blogs
        // Creates a blog owned by the requesting user.
        .route("/blogs", post(handlers::create_blog))
        // PUT /blogs/{id}
        // Owner-or-admin partial update; the summary follows the content.
        .route("/blogs/{id}", put(handlers::update_blog))
        // GET /users/{id}
        // Self-or-admin identity detail.
        .route("/users/{id}", get(handlers::get_user))
}
