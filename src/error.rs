//! Error types for the HTTP layer.
//!
//! Every failure a handler can produce is funnelled into [`ApiError`], which
//! maps one-to-one onto a response class and serializes as a JSON body of the
//! shape `{"code": ..., "message": ..., "errors": {...}}`.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::PolicyError;
use crate::filters::FilterError;
use crate::storage::StoreError;

/// Per-field validation failures collected while checking a write payload.
///
/// A write is applied only when this is empty, so a rejected request leaves
/// the store untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Ok when no field failed, otherwise the collected errors as an
    /// [`ApiError`].
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self))
        }
    }
}

/// Application error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    field_errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication credentials were not provided",
        )
    }

    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "forbidden",
            "you do not have permission to perform this action",
        )
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_filter_value", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        let mut err = Self::new(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "invalid input",
        );
        err.field_errors = Some(errors.fields);
        err
    }

    pub fn not_found(resource: impl fmt::Display, id: i64) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{resource} with id {id} not found"),
        )
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, code = self.code, message = %self.message, "request failed");
        }

        let body = ErrorBody {
            code: self.code,
            message: self.message,
            errors: self.field_errors,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Unauthenticated => Self::unauthenticated(),
            PolicyError::Forbidden => Self::forbidden(),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        Self::invalid_filter(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::not_found(kind, id),
            StoreError::SeatTaken { .. } => Self::conflict(err.to_string()),
            StoreError::Backend { message } => Self::internal(message),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = ApiError::invalid_filter("invalid id value: \"abc\"");
        assert_eq!(
            err.to_string(),
            "[invalid_filter_value] invalid id value: \"abc\""
        );
    }

    #[test]
    fn policy_errors_map_to_distinct_statuses() {
        let unauthenticated: ApiError = PolicyError::Unauthenticated.into();
        let forbidden: ApiError = PolicyError::Forbidden.into();
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn store_errors_map_to_statuses() {
        let not_found: ApiError = StoreError::NotFound {
            kind: "movie",
            id: 7,
        }
        .into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let taken: ApiError = StoreError::SeatTaken { row: 1, seat: 2 }.into();
        assert_eq!(taken.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_errors_collect_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());
        errors.push("title", "may not be blank");
        errors.push("duration", "must be a positive number of minutes");
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
