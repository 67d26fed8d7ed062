use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::ApiError;

/// The handler result type: a normalized success envelope or a classified
/// failure, both of which render themselves.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Pagination
///
/// The pagination block attached to list responses. All four fields are
/// always present; the defaults describe an empty first page.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            total: 0,
            total_pages: 0,
        }
    }
}

/// ApiResponse
///
/// Builder for the uniform success envelope
/// `{success: true, message, statusCode, data?, pagination?}`. Handlers pick
/// the shape by constructor; `IntoResponse` sets the transport status and
/// echoes it inside the body.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: String,
    data: Option<T>,
    pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Plain success (200) carrying a data payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: Some(data),
            pagination: None,
        }
    }

    /// Resource created (201).
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: message.into(),
            data: Some(data),
            pagination: None,
        }
    }

    /// Paginated success (200). The pagination block is always serialized.
    pub fn paginated(message: impl Into<String>, data: T, pagination: Pagination) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: Some(data),
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Success with no data payload; the `data` key is omitted entirely.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: None,
            pagination: None,
        }
    }
}

/// Serialized form of [`ApiResponse`]. Kept separate so the builder can own
/// a `StatusCode` while the wire shape carries the numeric echo.
#[derive(Debug, Serialize)]
struct SuccessEnvelope<T> {
    success: bool,
    message: String,
    #[serde(rename = "statusCode")]
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = SuccessEnvelope {
            success: true,
            message: self.message,
            status_code: self.status.as_u16(),
            data: self.data,
            pagination: self.pagination,
        };
        (self.status, Json(body)).into_response()
    }
}
