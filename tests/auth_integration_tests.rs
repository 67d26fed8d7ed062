use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use blog_api::{
    AppState,
    auth::{self, AuthUser, Claims},
    error::ApiError,
    models::{Blog, BlogWithAuthor, NewUser, Role, UpdateBlogRequest, User},
    repository::{Repository, RepositoryState},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};

// --- Stub Repository ---
// The extractor is stateless, so the store is never consulted; the stub
// only satisfies the state shape.

struct StubRepository;

#[async_trait]
impl Repository for StubRepository {
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, ApiError> {
        Ok(None)
    }
    async fn find_user_by_id(&self, _id: i64) -> Result<Option<User>, ApiError> {
        Ok(None)
    }
    async fn insert_user(&self, _new_user: NewUser) -> Result<User, ApiError> {
        Ok(User::default())
    }
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(vec![])
    }
    async fn insert_blog(
        &self,
        _title: String,
        _content: String,
        _summary: String,
        _user_id: i64,
    ) -> Result<Blog, ApiError> {
        Ok(Blog::default())
    }
    async fn list_blogs(
        &self,
        _page: i64,
        _limit: i64,
    ) -> Result<(Vec<BlogWithAuthor>, i64), ApiError> {
        Ok((vec![], 0))
    }
    async fn find_blog_by_id(&self, _id: i64) -> Result<Option<BlogWithAuthor>, ApiError> {
        Ok(None)
    }
    async fn update_blog(
        &self,
        _id: i64,
        _changes: UpdateBlogRequest,
        _summary: Option<String>,
    ) -> Result<Option<Blog>, ApiError> {
        Ok(None)
    }
    async fn delete_blog(&self, _id: i64) -> Result<bool, ApiError> {
        Ok(false)
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: i64 = 1;

fn create_token(user_id: i64, role: Role, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        role,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(jwt_secret: &str) -> AppState {
    let mut config = blog_api::config::AppConfig::default();
    config.jwt_secret = jwt_secret.to_string();

    AppState {
        repo: Arc::new(StubRepository) as RepositoryState,
        config,
    }
}

/// Builds the mutable Parts struct the extractor operates on.
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(TEST_USER_ID, Role::User, 3600);
    let app_state = create_app_state(TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn test_auth_carries_the_admin_role_from_the_claims() {
    // The role is trusted as-of issuance; no store lookup happens.
    let token = create_token(42, Role::Admin, 3600);
    let app_state = create_app_state(TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(user.id, 42);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(TEST_JWT_SECRET);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
async fn test_auth_failure_with_non_bearer_scheme() {
    let app_state = create_app_state(TEST_JWT_SECRET);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Well past the default decode leeway.
    let token = create_token(TEST_USER_ID, Role::User, -3600);
    let app_state = create_app_state(TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TokenExpired));
}

#[tokio::test]
async fn test_auth_failure_with_wrong_signing_secret() {
    let token = create_token(TEST_USER_ID, Role::User, 3600);
    let app_state = create_app_state("a-completely-different-secret");

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[tokio::test]
async fn test_auth_failure_with_garbage_token() {
    let app_state = create_app_state(TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, "not.a.jwt");

    let err = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[tokio::test]
async fn test_issue_token_roundtrips_through_the_extractor() {
    let token = auth::issue_token(7, Role::Admin, TEST_JWT_SECRET).unwrap();
    let app_state = create_app_state(TEST_JWT_SECRET);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    bearer(&mut parts, &token);

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.role, Role::Admin);
}

// --- Credential Hashing Tests ---

#[test]
fn test_password_hash_and_verify_roundtrip() {
    let hash = auth::hash_password("secret1").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(auth::verify_password(&hash, "secret1"));
    assert!(!auth::verify_password(&hash, "secret2"));
}

#[test]
fn test_password_hashes_are_salted() {
    let first = auth::hash_password("secret1").unwrap();
    let second = auth::hash_password("secret1").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_verify_rejects_a_malformed_hash() {
    assert!(!auth::verify_password("not-a-phc-string", "secret1"));
}
