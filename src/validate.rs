use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Serialize, de::DeserializeOwned};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    models::{CreateBlogRequest, LoginRequest, RegisterRequest, UpdateBlogRequest},
};

/// Violation
///
/// One failed constraint: the offending field and its message, in the order
/// the rules were declared.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

/// RuleSet
///
/// Accumulator for a declarative per-operation rule set. Every rule is
/// applied without short-circuiting, so a single response reports all
/// failures at once. Constraints on a field whose value is absent are
/// skipped entirely; only `required` fires for a missing field.
#[derive(Debug, Default)]
pub struct RuleSet {
    violations: Vec<Violation>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the rule chain for one field. `None` marks an absent field;
    /// present values are checked against their trimmed form.
    pub fn field<'a>(&mut self, name: &'static str, value: Option<&'a str>) -> FieldRules<'_, 'a> {
        FieldRules {
            rules: self,
            field: name,
            value: value.map(str::trim),
        }
    }

    /// Closes the set: empty means the payload may proceed to domain logic,
    /// otherwise the whole list travels in a single validation failure.
    pub fn finish(self) -> Result<(), ApiError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.violations))
        }
    }

    fn push(&mut self, field: &'static str, message: &str) {
        self.violations.push(Violation {
            field,
            message: message.to_string(),
        });
    }
}

/// FieldRules
///
/// Constraint chain for a single field, mirroring the declarative
/// field/constraint/message triples of the validation layer this replaces.
pub struct FieldRules<'r, 'a> {
    rules: &'r mut RuleSet,
    field: &'static str,
    value: Option<&'a str>,
}

impl FieldRules<'_, '_> {
    /// The field must be present and non-empty after trimming.
    pub fn required(self, message: &str) -> Self {
        match self.value {
            Some(v) if !v.is_empty() => {}
            _ => self.rules.push(self.field, message),
        }
        self
    }

    /// Character count must fall within `[min, max]`. Skipped when absent.
    pub fn length(self, min: usize, max: usize, message: &str) -> Self {
        if let Some(v) = self.value {
            let count = v.chars().count();
            if count < min || count > max {
                self.rules.push(self.field, message);
            }
        }
        self
    }

    /// Character count must be at least `min`. Skipped when absent.
    pub fn min_length(self, min: usize, message: &str) -> Self {
        if let Some(v) = self.value {
            if v.chars().count() < min {
                self.rules.push(self.field, message);
            }
        }
        self
    }

    /// The value must look like an email address. Skipped when absent.
    pub fn email(self, message: &str) -> Self {
        if let Some(v) = self.value {
            if !looks_like_email(v) {
                self.rules.push(self.field, message);
            }
        }
        self
    }

    /// The value must be one of the allowed literals. Skipped when absent.
    pub fn one_of(self, allowed: &[&str], message: &str) -> Self {
        if let Some(v) = self.value {
            if !allowed.contains(&v) {
                self.rules.push(self.field, message);
            }
        }
        self
    }
}

/// Minimal structural email check: exactly one '@', a non-empty local part,
/// and a dotted domain that neither starts nor ends with the dot.
fn looks_like_email(value: &str) -> bool {
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

// --- Per-operation rule sets ---

/// Registration rules: name 2–100, valid email, password ≥6, role (if
/// given) one of the known values.
pub fn register(payload: &RegisterRequest) -> Result<(), ApiError> {
    let mut rules = RuleSet::new();
    rules
        .field("name", Some(payload.name.as_str()))
        .required("Name is required")
        .length(2, 100, "Name must be between 2 and 100 characters");
    rules
        .field("email", Some(payload.email.as_str()))
        .required("Email is required")
        .email("Invalid email format");
    rules
        .field("password", Some(payload.password.as_str()))
        .required("Password is required")
        .min_length(6, "Password must be at least 6 characters");
    rules
        .field("role", payload.role.as_deref())
        .one_of(&["ADMIN", "USER"], "Role must be either ADMIN or USER");
    rules.finish()
}

/// Login rules: both fields present, email structurally valid.
pub fn login(payload: &LoginRequest) -> Result<(), ApiError> {
    let mut rules = RuleSet::new();
    rules
        .field("email", Some(payload.email.as_str()))
        .required("Email is required")
        .email("Invalid email format");
    rules
        .field("password", Some(payload.password.as_str()))
        .required("Password is required");
    rules.finish()
}

/// Blog creation rules: title 3–255, content ≥10.
pub fn create_blog(payload: &CreateBlogRequest) -> Result<(), ApiError> {
    let mut rules = RuleSet::new();
    rules
        .field("title", Some(payload.title.as_str()))
        .required("Title is required")
        .length(3, 255, "Title must be between 3 and 255 characters");
    rules
        .field("content", Some(payload.content.as_str()))
        .required("Content is required")
        .min_length(10, "Content must be at least 10 characters");
    rules.finish()
}

/// Blog update rules: both fields optional, constrained only when present.
pub fn update_blog(payload: &UpdateBlogRequest) -> Result<(), ApiError> {
    let mut rules = RuleSet::new();
    rules
        .field("title", payload.title.as_deref())
        .length(3, 255, "Title must be between 3 and 255 characters");
    rules
        .field("content", payload.content.as_deref())
        .min_length(10, "Content must be at least 10 characters");
    rules.finish()
}

/// ApiJson
///
/// Drop-in replacement for `axum::Json` whose rejection is an [`ApiError`],
/// so malformed or undecodable bodies surface as the standard error
/// envelope instead of the framework's plain-text response.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(payload)) => Ok(ApiJson(payload)),
            Err(rejection) => Err(ApiError::Validation(vec![Violation {
                field: "body",
                message: rejection.body_text(),
            }])),
        }
    }
}
