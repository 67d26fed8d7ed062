use crate::{auth::AuthUser, error::ApiError, models::Role};

/// Action
///
/// Every role- or ownership-gated operation the API exposes. Handlers name
/// the action they are about to perform and let [`allow`] decide, instead
/// of repeating role comparisons inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateBlog,
    ReadBlog,
    UpdateBlog,
    DeleteBlog,
    ListUsers,
    ReadUser,
}

/// allow
///
/// The pure authorization decision over (actor, action, resource owner).
/// `owner_id` is the owning user of the target resource where one exists:
/// the blog's author, or the user record being read.
///
/// Rules, in precedence order:
/// 1. Reads and creates are open to any actor that reached this point
///    (creation is already behind the authentication gate).
/// 2. Blog update: admin, or the actor owns the blog.
/// 3. Blog delete: admin only. Ownership grants edit, not delete.
/// 4. User listing: admin only.
/// 5. User detail: admin, or the actor is the addressed user.
pub fn allow(actor: &AuthUser, action: Action, owner_id: Option<i64>) -> bool {
    match action {
        Action::CreateBlog | Action::ReadBlog => true,
        Action::UpdateBlog => actor.role == Role::Admin || owner_id == Some(actor.id),
        Action::DeleteBlog => actor.role == Role::Admin,
        Action::ListUsers => actor.role == Role::Admin,
        Action::ReadUser => actor.role == Role::Admin || owner_id == Some(actor.id),
    }
}

/// ensure
///
/// Adapter used by handlers: a denial is always the uniform `Forbidden`
/// failure ("Access denied"), never a partial or field-level result.
pub fn ensure(actor: &AuthUser, action: Action, owner_id: Option<i64>) -> Result<(), ApiError> {
    if allow(actor, action, owner_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
