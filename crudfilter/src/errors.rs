//! # Error Handling
//!
//! Every CRUD operation returns `Result<_, ApiError>`. The enum maps onto HTTP status
//! codes and renders a sanitized JSON body; database and internal details are logged
//! through `tracing` and never sent to the client.
//!
//! Malformed filter input is not an error anywhere in this crate: unknown fields,
//! unknown relations and malformed sort entries are dropped by the translator. The
//! variants below are what remains.
//!
//! ```rust,ignore
//! async fn handler(State(ops): State<CrudState>, Path(id): Path<String>) -> Result<Json<Record>, ApiError> {
//!     let record = ops.get_by_id(&id, &QueryParams::default()).await?
//!         .ok_or_else(|| ApiError::not_found("user", Some(id)))?;
//!     Ok(Json(record))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound {
        /// Resource name (e.g. "users")
        resource: String,
        /// Key that was looked up, when known
        id: Option<String>,
    },

    /// 400 Bad Request - the record store rejected part of the composed query
    BadRequest { message: String },

    /// 409 Conflict - unique constraint violation
    Conflict { message: String },

    /// 422 Unprocessable Entity - written attributes failed coercion
    ValidationFailed { errors: Vec<String> },

    /// 500 - database failure, details logged only
    Database { message: String, internal: DbErr },

    /// 500 - anything else, details logged only
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Wrap a database error. The error itself is logged, never rendered.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to API clients
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::ValidationFailed { errors } => {
                if errors.len() == 1 {
                    errors[0].clone()
                } else {
                    format!("Validation failed: {}", errors.join(", "))
                }
            }
            Self::BadRequest { message }
            | Self::Conflict { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let body = match &self {
            Self::ValidationFailed { errors } => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.clone()),
            },
            _ => ErrorResponse {
                error: self.user_message(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `RecordNotFound` becomes 404, unique violations 409, everything else 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            let resource = msg.split_whitespace().next().unwrap_or("Resource");
            return Self::not_found(resource, None);
        }
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::conflict(format!("Conflict: {detail}"));
        }
        Self::database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_with_id() {
        let err = ApiError::not_found("users", Some("7".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "users with ID '7' not found");
    }

    #[test]
    fn test_not_found_without_id() {
        let err = ApiError::not_found("users", None);
        assert_eq!(err.user_message(), "users not found");
    }

    #[test]
    fn test_validation_failed_messages() {
        let single = ApiError::validation_failed(vec!["age: expected an integer".to_string()]);
        assert_eq!(single.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(single.user_message(), "age: expected an integer");

        let many = ApiError::validation_failed(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(many.user_message(), "Validation failed: a, b");
    }

    #[test]
    fn test_database_error_is_sanitized() {
        let err = ApiError::database(DbErr::Custom("secret table name".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "A database error occurred");
        assert_eq!(err.to_string(), "A database error occurred");
    }

    #[test]
    fn test_dberr_record_not_found_becomes_404() {
        let api_err: ApiError = DbErr::RecordNotFound("posts not found".to_string()).into();
        assert_eq!(api_err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(api_err.user_message(), "posts not found");
    }

    #[test]
    fn test_other_dberr_become_500() {
        for db_err in [
            DbErr::Custom("x".to_string()),
            DbErr::Type("y".to_string()),
            DbErr::Json("z".to_string()),
        ] {
            let api_err: ApiError = db_err.into();
            assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (ApiError::bad_request("x"), StatusCode::BAD_REQUEST),
            (ApiError::conflict("x"), StatusCode::CONFLICT),
            (ApiError::internal("x", None), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
        }
    }
}
