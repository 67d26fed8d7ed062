use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::{config::AppConfig, error::ApiError, models::Role};

/// Token lifetime: 24 hours. Role changes made after issuance only take
/// effect at the next login, because verification never re-reads the store.
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Claims
///
/// The signed JWT payload. The resolved identity comes entirely from these
/// claims: `sub` and `role` are trusted as-of issuance rather than
/// re-validated against the Identity Store on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id in the Identity Store.
    pub sub: i64,
    /// Role captured at login time.
    pub role: Role,
    /// Expiration time. Always validated on decode.
    pub exp: usize,
    /// Issued at.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request: who is acting and
/// with which role. This is the actor handed to the authorization policy.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// issue_token
///
/// Signs a bearer token for a freshly authenticated user.
pub fn issue_token(user_id: i64, role: Role, secret: &str) -> Result<String, ApiError> {
    let now = unix_now();
    let claims = Claims {
        sub: user_id,
        role,
        iat: now as usize,
        exp: (now + TOKEN_TTL_SECS) as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| ApiError::Internal(e.to_string()))
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any protected handler and keeping authentication
/// out of the business logic entirely.
///
/// The process:
/// 1. Pull the bearer token from the Authorization header.
/// 2. Decode against the server-held signing secret, expiry enforced.
/// 3. Hand back the identity carried in the claims.
///
/// Rejections are classified, not bare status codes: a missing or
/// non-Bearer header is `Unauthenticated`, an expired token is
/// `TokenExpired`, and every other decode failure is `InvalidToken`. All
/// of them render the 401 error envelope.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the signing secret).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // 1. Token Extraction
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        // 2. Decode and Validate
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                // Bad signature, malformed token, wrong algorithm, etc.
                _ => ApiError::InvalidToken,
            }
        })?;

        // 3. The claims are the identity; no store lookup here.
        Ok(AuthUser {
            id: token_data.claims.sub,
            role: token_data.claims.role,
        })
    }
}

// --- Credential Hashing ---

/// hash_password
///
/// Argon2id hash with a fresh random salt, returned as a PHC string ready
/// for the `password_hash` column.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| ApiError::Internal(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| ApiError::Internal(e.to_string()))?;

    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// verify_password
///
/// Constant result shape: any parse or verification failure is simply a
/// non-match.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
