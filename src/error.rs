use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::validate::Violation;

/// Controls whether internal error detail is echoed to clients. Set once at
/// startup from the runtime environment; production keeps it off so only the
/// generic message leaves the process.
static EXPOSE_INTERNAL: AtomicBool = AtomicBool::new(false);

/// expose_internal_errors
///
/// Enables or disables the `detail` field on 500 responses. Called from the
/// bootstrap path (and from tests that assert on both modes).
pub fn expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL.store(enabled, Ordering::Relaxed);
}

/// ApiError
///
/// The closed failure taxonomy for the whole request pipeline. Every
/// fallible path (validation, authentication, authorization, store calls)
/// ends up here, and this is the only place status codes are decided.
/// Handlers propagate with `?`; axum renders the error envelope through
/// `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A uniqueness constraint was hit, either by the application pre-check
    /// or by the database itself.
    #[error("{field} already exists")]
    UniqueViolation { field: String },

    /// One or more request fields failed validation. Carries the full
    /// violation list; nothing was written.
    #[error("Validation failed")]
    Validation(Vec<Violation>),

    /// Login rejection. Deliberately identical for an unknown email and a
    /// wrong password so responses do not reveal which emails are
    /// registered.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No usable bearer credential on a route that requires one.
    #[error("Authentication required")]
    Unauthenticated,

    /// The bearer token was present but failed signature or structural
    /// verification.
    #[error("Invalid token")]
    InvalidToken,

    /// The bearer token verified but is past its expiry claim.
    #[error("Token expired")]
    TokenExpired,

    /// The authenticated actor is not permitted to perform the operation.
    #[error("Access denied")]
    Forbidden,

    /// The addressed resource does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Anything unclassified. The detail is logged and kept server-side
    /// unless internal exposure is enabled.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Convenience constructor for the common "{resource} not found" case.
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource: resource.into(),
        }
    }

    /// status
    ///
    /// The transport status for this failure, per the classification table.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UniqueViolation { .. }
            | ApiError::Validation(_)
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated | ApiError::InvalidToken | ApiError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// client_message
    ///
    /// The message placed in the error envelope. Validation failures join
    /// their field messages; internal failures always collapse to the
    /// generic message.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Validation(violations) => violations
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        }
    }
}

/// ErrorEnvelope
///
/// The serialized error shape: `{success: false, message, statusCode}` plus
/// the violation list when validation failed and the internal detail when
/// exposure is enabled.
#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    message: String,
    #[serde(rename = "statusCode")]
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [Violation]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let ApiError::Internal(detail) = &self {
            // The only place unclassified failures become visible; the
            // client payload stays generic regardless.
            tracing::error!(detail = %detail, "unclassified failure reached the error classifier");
        }

        let errors = match &self {
            ApiError::Validation(violations) => Some(violations.as_slice()),
            _ => None,
        };

        let detail = match &self {
            ApiError::Internal(detail) if EXPOSE_INTERNAL.load(Ordering::Relaxed) => {
                Some(detail.as_str())
            }
            _ => None,
        };

        let body = ErrorEnvelope {
            success: false,
            message: self.client_message(),
            status_code: status.as_u16(),
            errors,
            detail,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    /// Maps store failures into the taxonomy. Unique-constraint violations
    /// become 400s with the offending field named after the constraint
    /// (`users_email_key` → `email`); everything else is unclassified.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = db_err
                    .constraint()
                    .and_then(|name| name.split('_').nth(1))
                    .unwrap_or("value")
                    .to_string();
                return ApiError::UniqueViolation { field };
            }
        }
        ApiError::Internal(err.to_string())
    }
}
