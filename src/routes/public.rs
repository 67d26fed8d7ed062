use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a credential: liveness, the identity entry
/// points (register/login), and read-only blog access. Everything here
/// still responds through the normalized envelope, including failures.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Monitoring/load balancer probe.
        .route("/health", get(handlers::health))
        // POST /auth/register
        // New identity creation. Duplicate emails fail without writing.
        .route("/auth/register", post(handlers::register))
        // POST /auth/login
        // Credential verification and token issuance.
        .route("/auth/login", post(handlers::login))
        // GET /blogs?page=&limit=
        // Paginated public listing with the author joined in.
        .route("/blogs", get(handlers::list_blogs))
        // GET /blogs/{id}
        // Single blog detail.
        .route("/blogs/{id}", get(handlers::get_blog))
}
