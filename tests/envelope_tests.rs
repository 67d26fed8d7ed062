use axum::{http::StatusCode, response::IntoResponse};
use blog_api::{
    error::{ApiError, expose_internal_errors},
    models::UserResponse,
    response::{ApiResponse, Pagination},
    validate::Violation,
};
use serde_json::Value;
use serial_test::serial;

// --- Helpers ---

async fn render(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    let json = serde_json::from_slice(&bytes).expect("body was not JSON");
    (status, json)
}

// --- Success envelopes ---

#[tokio::test]
async fn test_success_envelope_shape() {
    let response = ApiResponse::success("Login successful", UserResponse::default());
    let (status, body) = render(response.into_response()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["message"], "Login successful");
    // The transport status is echoed inside the body.
    assert_eq!(body["statusCode"], 200);
    assert!(body.get("data").is_some());
    assert!(body.get("pagination").is_none());
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_created_envelope_uses_201() {
    let response = ApiResponse::created("User registered successfully", UserResponse::default());
    let (status, body) = render(response.into_response()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["statusCode"], 201);
}

#[tokio::test]
async fn test_message_only_envelope_omits_the_data_key() {
    let response = ApiResponse::message_only("Blog deleted successfully");
    let (_, body) = render(response.into_response()).await;

    // Omitted entirely, not serialized as null.
    assert!(body.get("data").is_none());
    assert_eq!(body["success"], Value::Bool(true));
}

#[tokio::test]
async fn test_paginated_envelope_carries_all_four_fields() {
    let response = ApiResponse::paginated(
        "Blogs retrieved successfully",
        Vec::<UserResponse>::new(),
        Pagination {
            page: 2,
            limit: 5,
            total: 12,
            total_pages: 3,
        },
    );
    let (_, body) = render(response.into_response()).await;

    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["limit"], 5);
    assert_eq!(body["pagination"]["total"], 12);
    assert_eq!(body["pagination"]["totalPages"], 3);
}

#[test]
fn test_pagination_defaults_describe_an_empty_first_page() {
    let pagination = Pagination::default();
    assert_eq!(pagination.page, 1);
    assert_eq!(pagination.limit, 10);
    assert_eq!(pagination.total, 0);
    assert_eq!(pagination.total_pages, 0);
}

// --- Error classification ---

#[tokio::test]
async fn test_unique_violation_names_the_field() {
    let err = ApiError::UniqueViolation {
        field: "email".to_string(),
    };
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let (status, body) = render(err.into_response()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], Value::Bool(false));
    assert_eq!(body["message"], "email already exists");
    assert_eq!(body["statusCode"], 400);
}

#[tokio::test]
async fn test_validation_error_joins_messages_and_carries_the_list() {
    let err = ApiError::Validation(vec![
        Violation {
            field: "title",
            message: "Title is required".to_string(),
        },
        Violation {
            field: "content",
            message: "Content must be at least 10 characters".to_string(),
        },
    ]);

    let (status, body) = render(err.into_response()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Title is required, Content must be at least 10 characters"
    );

    let errors = body["errors"].as_array().expect("errors array missing");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["field"], "title");
    assert_eq!(errors[1]["message"], "Content must be at least 10 characters");
}

#[tokio::test]
async fn test_credential_failures_map_to_their_fixed_statuses() {
    let cases = [
        (ApiError::InvalidCredentials, StatusCode::BAD_REQUEST, "Invalid credentials"),
        (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED, "Authentication required"),
        (ApiError::InvalidToken, StatusCode::UNAUTHORIZED, "Invalid token"),
        (ApiError::TokenExpired, StatusCode::UNAUTHORIZED, "Token expired"),
        (ApiError::Forbidden, StatusCode::FORBIDDEN, "Access denied"),
    ];

    for (err, expected_status, expected_message) in cases {
        let (status, body) = render(err.into_response()).await;
        assert_eq!(status, expected_status);
        assert_eq!(body["message"], expected_message);
        assert_eq!(body["statusCode"], expected_status.as_u16());
    }
}

#[tokio::test]
async fn test_not_found_names_the_resource() {
    let (status, body) = render(ApiError::not_found("Blog").into_response()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Blog not found");
}

#[tokio::test]
#[serial]
async fn test_internal_error_suppresses_detail_by_default() {
    expose_internal_errors(false);

    let err = ApiError::Internal("connection refused (os error 111)".to_string());
    let (status, body) = render(err.into_response()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
    assert!(body.get("detail").is_none());
}

#[tokio::test]
#[serial]
async fn test_internal_error_detail_exposed_outside_production() {
    expose_internal_errors(true);

    let err = ApiError::Internal("connection refused (os error 111)".to_string());
    let (_, body) = render(err.into_response()).await;
    assert_eq!(body["detail"], "connection refused (os error 111)");
    // The client-facing message stays generic regardless.
    assert_eq!(body["message"], "Internal server error");

    expose_internal_errors(false);
}

#[test]
fn test_store_errors_without_a_constraint_are_unclassified() {
    let err = ApiError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, ApiError::Internal(_)));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
