use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get},
};

/// Admin Router Module
///
/// Endpoints reserved for the ADMIN role: the user listing and blog
/// removal. Authentication is enforced by the middleware layer above this
/// router; the role requirement itself lives in the authorization policy
/// invoked by each handler, so a plain USER gets the uniform 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /users
        // Lists every registered identity.
        .route("/users", get(handlers::list_users))
        // DELETE /blogs/{id}
        // Removes any blog. Ownership grants edit, never delete.
        .route("/blogs/{id}", delete(handlers::delete_blog))
}
