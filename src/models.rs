use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The RBAC field stored on every user row. Only these two values exist;
/// anything else is rejected by the request validator before it reaches the
/// database. Unspecified roles default to `USER` at registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, TS, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(()),
        }
    }
}

/// User
///
/// The canonical identity record stored in the `users` table, including the
/// password hash. This struct never crosses the API boundary directly;
/// handlers convert it to [`UserResponse`] so the hash cannot leak into a
/// serialized payload.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub name: String,
    // The user's primary identifier, unique across the store.
    pub email: String,
    // Argon2 PHC string. Excluded from serialization as a second line of
    // defense behind the UserResponse conversion.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload for the Identity Store. Built by the register handler
/// after validation, email normalization, and password hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Blog
///
/// A blog post row from the `blogs` table. `summary` is derived from
/// `content` at write time and is never edited independently. `user_id` is
/// fixed at creation; ownership never transfers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    // FK to users.id (owner). Cascades on user deletion.
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// BlogWithAuthor
///
/// A blog row augmented with the owner's name and email (a JOIN against
/// `users`). Used by the list and detail queries; the author columns fall
/// back to None when a query does not select them.
#[derive(Debug, Clone, FromRow, Default)]
pub struct BlogWithAuthor {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub author_name: Option<String>,
    #[sqlx(default)]
    pub author_email: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /auth/register. `role` arrives as a raw string so
/// the validator can report bad values through the normal violation list
/// instead of a deserialization failure; absent means USER.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// LoginRequest
///
/// Input payload for POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateBlogRequest
///
/// Input payload for POST /blogs. The summary is derived server-side; the
/// client never supplies it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
}

/// UpdateBlogRequest
///
/// Partial update payload for PUT /blogs/{id}. Absent fields keep their
/// stored values; a new `content` also recomputes the summary.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateBlogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// --- Response Schemas (Output) ---

/// UserResponse
///
/// The client-visible projection of a user: everything except the password
/// hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// RegisterResponse
///
/// Data payload of a successful registration (201).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterResponse {
    pub user: UserResponse,
}

/// LoginResponse
///
/// Data payload of a successful login: the signed bearer token plus the
/// user projection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// UserListResponse
///
/// Data payload for the admin-only user listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

/// UserDetailResponse
///
/// Data payload for the self-or-admin user detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserDetailResponse {
    pub user: UserResponse,
}

/// BlogAuthor
///
/// The owner projection embedded in blog responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogAuthor {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// BlogResponse
///
/// The client-visible blog shape. `author` is present on reads that join
/// the owner and omitted on write responses that do not.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<BlogAuthor>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<Blog> for BlogResponse {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            title: blog.title,
            content: blog.content,
            summary: blog.summary,
            user_id: blog.user_id,
            author: None,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

impl From<BlogWithAuthor> for BlogResponse {
    fn from(row: BlogWithAuthor) -> Self {
        // Both author columns are selected together; treat a missing name as
        // a row without the join.
        let author = match (row.author_name, row.author_email) {
            (Some(name), Some(email)) => Some(BlogAuthor {
                id: row.user_id,
                name,
                email,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            summary: row.summary,
            user_id: row.user_id,
            author,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
