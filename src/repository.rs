use crate::{
    error::ApiError,
    models::{Blog, BlogWithAuthor, NewUser, UpdateBlogRequest, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Repository Trait
///
/// The abstract contract for the Identity and Content Stores. Handlers talk
/// to this trait object only, which keeps the persistence engine swappable
/// (Postgres in production, in-memory doubles in tests).
///
/// Store failures are not absorbed here: every method returns a Result and
/// the error conversion in `error.rs` decides how a given database failure
/// is classified.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn
/// Repository>`) shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Identity Store ---
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, ApiError>;
    async fn insert_user(&self, new_user: NewUser) -> Result<User, ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    // --- Content Store ---
    async fn insert_blog(
        &self,
        title: String,
        content: String,
        summary: String,
        user_id: i64,
    ) -> Result<Blog, ApiError>;
    /// Paginated listing joined with the owner, newest first, plus the
    /// total row count for the pagination block.
    async fn list_blogs(&self, page: i64, limit: i64)
    -> Result<(Vec<BlogWithAuthor>, i64), ApiError>;
    async fn find_blog_by_id(&self, id: i64) -> Result<Option<BlogWithAuthor>, ApiError>;
    /// Partial update; absent fields keep their stored values. Returns the
    /// updated row, or None when the id no longer exists.
    async fn update_blog(
        &self,
        id: i64,
        changes: UpdateBlogRequest,
        summary: Option<String>,
    ) -> Result<Option<Blog>, ApiError>;
    /// Returns true when a row was actually deleted.
    async fn delete_blog(&self, id: i64) -> Result<bool, ApiError>;
}

/// RepositoryState
///
/// The concrete type used to share store access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The production implementation, backed by the PostgreSQL pool. One
/// logical statement per call; the pool owns connection checkout and
/// return.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// insert_user
    ///
    /// The UNIQUE constraint on `email` is the race-proof backstop behind
    /// the handler's duplicate pre-check; a violation surfaces as the 400
    /// duplicate error, not a 500.
    async fn insert_user(&self, new_user: NewUser) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, password_hash, role, created_at",
        )
        .bind(new_user.name)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at \
             FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn insert_blog(
        &self,
        title: String,
        content: String,
        summary: String,
        user_id: i64,
    ) -> Result<Blog, ApiError> {
        let blog = sqlx::query_as::<_, Blog>(
            "INSERT INTO blogs (title, content, summary, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, title, content, summary, user_id, created_at, updated_at",
        )
        .bind(title)
        .bind(content)
        .bind(summary)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(blog)
    }

    /// list_blogs
    ///
    /// Two statements: the page itself (owner joined, newest first) and the
    /// total count the pagination block reports.
    async fn list_blogs(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<BlogWithAuthor>, i64), ApiError> {
        let offset = (page - 1) * limit;

        let rows = sqlx::query_as::<_, BlogWithAuthor>(
            "SELECT b.id, b.title, b.content, b.summary, b.user_id, \
                    b.created_at, b.updated_at, \
                    u.name AS author_name, u.email AS author_email \
             FROM blogs b \
             JOIN users u ON b.user_id = u.id \
             ORDER BY b.created_at DESC \
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blogs")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn find_blog_by_id(&self, id: i64) -> Result<Option<BlogWithAuthor>, ApiError> {
        let blog = sqlx::query_as::<_, BlogWithAuthor>(
            "SELECT b.id, b.title, b.content, b.summary, b.user_id, \
                    b.created_at, b.updated_at, \
                    u.name AS author_name, u.email AS author_email \
             FROM blogs b \
             JOIN users u ON b.user_id = u.id \
             WHERE b.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(blog)
    }

    /// update_blog
    ///
    /// COALESCE keeps unspecified columns at their stored values, so a
    /// partial payload is a single UPDATE rather than a read-modify-write.
    /// The summary travels with the content that produced it.
    async fn update_blog(
        &self,
        id: i64,
        changes: UpdateBlogRequest,
        summary: Option<String>,
    ) -> Result<Option<Blog>, ApiError> {
        let blog = sqlx::query_as::<_, Blog>(
            "UPDATE blogs \
             SET title = COALESCE($2, title), \
                 content = COALESCE($3, content), \
                 summary = COALESCE($4, summary), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, title, content, summary, user_id, created_at, updated_at",
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .bind(summary)
        .fetch_optional(&self.pool)
        .await?;
        Ok(blog)
    }

    async fn delete_blog(&self, id: i64) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
