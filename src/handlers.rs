use crate::{
    AppState, auth,
    auth::AuthUser,
    error::ApiError,
    models::{
        BlogResponse, CreateBlogRequest, LoginRequest, LoginResponse, NewUser, RegisterRequest,
        RegisterResponse, Role, UpdateBlogRequest, UserDetailResponse, UserListResponse,
        UserResponse,
    },
    policy::{self, Action},
    response::{ApiResponse, ApiResult, Pagination},
    summary::derive_summary,
    validate::{self, ApiJson},
};
use axum::extract::{Path, Query, State};
use serde::Deserialize;

// --- Query Structs ---

/// PageQuery
///
/// Accepted query parameters for the public blog listing (GET /blogs).
/// Missing or non-positive values fall back to page=1, limit=10.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    fn normalized(&self) -> (i64, i64) {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = self.limit.filter(|l| *l >= 1).unwrap_or(10);
        (page, limit)
    }
}

// --- Handlers ---

/// health
///
/// [Public Route] Liveness probe for monitoring and load balancer checks.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> ApiResponse<()> {
    ApiResponse::message_only("API is running")
}

/// register
///
/// [Public Route] Creates a new identity. Validation runs first and
/// collects every violation; the duplicate-email pre-check (plus the
/// database UNIQUE backstop) guarantees a failed registration writes
/// nothing. The password is hashed before it ever reaches the store.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid payload or duplicate email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    validate::register(&payload)?;

    // Normalized form is what uniqueness is judged against.
    let email = payload.email.trim().to_lowercase();

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::UniqueViolation {
            field: "email".to_string(),
        });
    }

    let password_hash = auth::hash_password(&payload.password)?;
    // Validation has already confined the role to the known values.
    let role = payload
        .role
        .as_deref()
        .map(str::trim)
        .and_then(|r| r.parse::<Role>().ok())
        .unwrap_or_default();

    let user = state
        .repo
        .insert_user(NewUser {
            name: payload.name.trim().to_string(),
            email,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(email = %user.email, "new user registered");

    Ok(ApiResponse::created(
        "User registered successfully",
        RegisterResponse { user: user.into() },
    ))
}

/// login
///
/// [Public Route] Verifies credentials and issues a bearer token whose
/// claims carry the id and role for the token's lifetime.
///
/// *Note*: an unknown email and a wrong password produce the identical
/// "Invalid credentials" failure, so the response never reveals whether an
/// email is registered.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    validate::login(&payload)?;

    let email = payload.email.trim().to_lowercase();

    let user = state
        .repo
        .find_user_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&user.password_hash, &payload.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::issue_token(user.id, user.role, &state.config.jwt_secret)?;

    tracing::info!(email = %user.email, "user logged in");

    Ok(ApiResponse::success(
        "Login successful",
        LoginResponse {
            token,
            user: user.into(),
        },
    ))
}

/// list_users
///
/// [Admin Route] Lists every registered identity.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(auth_user: AuthUser, State(state): State<AppState>) -> ApiResult<UserListResponse> {
    policy::ensure(&auth_user, Action::ListUsers, None)?;

    let users = state.repo.list_users().await?;
    Ok(ApiResponse::success(
        "Users retrieved successfully",
        UserListResponse {
            users: users.into_iter().map(UserResponse::from).collect(),
        },
    ))
}

/// get_user
///
/// [Authenticated Route] Single identity detail, restricted to the user
/// themselves or an admin. The policy check runs against the addressed id
/// before the store is consulted, so outsiders get 403 even for ids that
/// do not exist.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User detail", body = UserDetailResponse),
        (status = 403, description = "Not self or admin"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<UserDetailResponse> {
    policy::ensure(&auth_user, Action::ReadUser, Some(id))?;

    let user = state
        .repo
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(ApiResponse::success(
        "User retrieved successfully",
        UserDetailResponse { user: user.into() },
    ))
}

/// create_blog
///
/// [Authenticated Route] Creates a blog post owned by the requesting user.
/// The summary is derived from the content here; clients never supply it.
#[utoipa::path(
    post,
    path = "/blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Created", body = BlogResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBlogRequest>,
) -> ApiResult<BlogResponse> {
    validate::create_blog(&payload)?;

    let summary = derive_summary(&payload.content);
    let blog = state
        .repo
        .insert_blog(payload.title, payload.content, summary, auth_user.id)
        .await?;

    Ok(ApiResponse::created(
        "Blog created successfully",
        blog.into(),
    ))
}

/// list_blogs
///
/// [Public Route] Paginated listing, newest first, each entry joined with
/// its author. The pagination block always carries page, limit, total and
/// totalPages.
#[utoipa::path(
    get,
    path = "/blogs",
    params(PageQuery),
    responses((status = 200, description = "Page of blogs", body = [BlogResponse]))
)]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<BlogResponse>> {
    let (page, limit) = query.normalized();

    let (rows, total) = state.repo.list_blogs(page, limit).await?;
    let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

    Ok(ApiResponse::paginated(
        "Blogs retrieved successfully",
        rows.into_iter().map(BlogResponse::from).collect(),
        Pagination {
            page,
            limit,
            total,
            total_pages,
        },
    ))
}

/// get_blog
///
/// [Public Route] Single blog detail with its author.
#[utoipa::path(
    get,
    path = "/blogs/{id}",
    params(("id" = i64, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Found", body = BlogResponse),
        (status = 404, description = "No such blog")
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<BlogResponse> {
    let blog = state
        .repo
        .find_blog_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;

    Ok(ApiResponse::success(
        "Blog retrieved successfully",
        blog.into(),
    ))
}

/// update_blog
///
/// [Authenticated Route] Partial update, allowed to the owner or an admin.
/// The existing row is fetched first (404 before 403, matching the delete
/// path), then the policy decides, then a single COALESCE update applies
/// whichever fields were supplied. New content always recomputes the
/// summary.
#[utoipa::path(
    put,
    path = "/blogs/{id}",
    request_body = UpdateBlogRequest,
    params(("id" = i64, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Updated", body = BlogResponse),
        (status = 403, description = "Not owner or admin"),
        (status = 404, description = "No such blog")
    )
)]
pub async fn update_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateBlogRequest>,
) -> ApiResult<BlogResponse> {
    validate::update_blog(&payload)?;

    let existing = state
        .repo
        .find_blog_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;

    policy::ensure(&auth_user, Action::UpdateBlog, Some(existing.user_id))?;

    // Summary follows the content; untouched content keeps the stored one.
    let summary = payload.content.as_deref().map(derive_summary);

    let blog = state
        .repo
        .update_blog(id, payload, summary)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;

    Ok(ApiResponse::success(
        "Blog updated successfully",
        blog.into(),
    ))
}

/// delete_blog
///
/// [Admin Route] Removes a blog post. Ownership does not grant delete;
/// only the admin role does.
#[utoipa::path(
    delete,
    path = "/blogs/{id}",
    params(("id" = i64, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such blog")
    )
)]
pub async fn delete_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    // Existence first so admins and non-admins alike see 404 for a dead id.
    state
        .repo
        .find_blog_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;

    policy::ensure(&auth_user, Action::DeleteBlog, None)?;

    if !state.repo.delete_blog(id).await? {
        return Err(ApiError::not_found("Blog"));
    }

    Ok(ApiResponse::message_only("Blog deleted successfully"))
}
