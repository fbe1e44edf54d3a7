//! Error types shared by services and HTTP handlers.
//!
//! Services return [`ServiceError`]; handlers wrap it in [`ApiError`]. Both
//! render the same [`ErrorResponse`] body, stamped with the current request id.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{error::DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Conflict",
    "message": "Integrity error: Product 7 is on 3 purchase items",
    "request_id": "4b0e2c1e-8d7a-4a55-9a43-1f0c2f6b9e10",
    "timestamp": "2024-03-01T10:30:00+00:00"
}))]
pub struct ErrorResponse {
    /// Reason phrase of the status code
    pub error: String,
    pub message: String,
    /// Offending fields of a rejected payload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(status: StatusCode, message: String, fields: Vec<FieldError>) -> Self {
        Self {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            fields,
            request_id: crate::tracing::current_request_id().map(|rid| rid.0),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn render(status: StatusCode, message: String, fields: Vec<FieldError>) -> Response {
        (status, Json(Self::new(status, message, fields))).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload failed its declared constraints
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        fields: Vec<FieldError>,
    },

    /// Payload is well-formed but refers to something unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A write rejected because of referential or uniqueness rules.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    #[error("Database error: {0}")]
    DatabaseError(DbErr),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                ServiceError::IntegrityError(format!("referenced record constraint: {}", detail))
            }
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                ServiceError::IntegrityError(format!("duplicate value: {}", detail))
            }
            _ => ServiceError::DatabaseError(err),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        ServiceError::ValidationError {
            message: err.to_string(),
            fields,
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError { .. } | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::IntegrityError(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client; server-side failures stay generic.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let message = self.response_message();
        let fields = match self {
            Self::ValidationError { fields, .. } => fields,
            _ => Vec::new(),
        };
        ErrorResponse::render(status, message, fields)
    }
}

/// Errors raised at the HTTP layer, before or after the services run
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    /// Query parameters outside their accepted range
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceError(service_error) => service_error.into_response(),
            ApiError::ValidationError(msg) => {
                ErrorResponse::render(StatusCode::BAD_REQUEST, msg, Vec::new())
            }
            ApiError::Unauthorized => ErrorResponse::render(
                StatusCode::UNAUTHORIZED,
                "Missing or invalid admin token".to_string(),
                Vec::new(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    async fn body_of(response: Response) -> ErrorResponse {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 1))]
        quantity: i32,
    }

    #[tokio::test]
    async fn error_body_carries_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::NotFound("Product 4 not found".into()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let payload = body_of(response).await;
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(payload.error, "Not Found");
        assert_eq!(payload.message, "Not found: Product 4 not found");
    }

    #[tokio::test]
    async fn validation_errors_list_each_field() {
        let err: ServiceError = Sample {
            name: String::new(),
            quantity: 0,
        }
        .validate()
        .unwrap_err()
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let payload = body_of(response).await;
        let fields: Vec<&str> = payload.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "quantity"]);
        assert_eq!(payload.fields[0].message, "name is required");
        assert_eq!(payload.fields[1].message, "range");
    }

    #[tokio::test]
    async fn unauthorized_has_fixed_message() {
        let payload = body_of(ApiError::Unauthorized.into_response()).await;
        assert_eq!(payload.error, "Unauthorized");
        assert_eq!(payload.message, "Missing or invalid admin token");
        assert!(payload.request_id.is_none());
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ServiceError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::IntegrityError("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_failures_hide_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("constraint xyz on table abc".into()))
                .response_message(),
            "Database error"
        );
        assert_eq!(
            ServiceError::InternalError("Product 3 has no category".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::IntegrityError("Category 3 is used by 2 products".into())
                .response_message(),
            "Integrity error: Category 3 is used by 2 products"
        );
    }

    #[test]
    fn plain_db_errors_stay_database_errors() {
        let err: ServiceError = DbErr::RecordNotFound("gone".into()).into();
        assert!(matches!(err, ServiceError::DatabaseError(_)));
    }
}
