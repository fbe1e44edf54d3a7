use crate::{
    errors::{ApiError, ServiceError},
    services::PageRequest,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Pagination parameters for admin list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    pub per_page: Option<u64>,
}

fn default_page() -> u64 {
    1
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: None,
        }
    }
}

impl PaginationParams {
    /// Validates the numbers against the configured page sizes.
    pub fn page_request(&self, default_per_page: u64, max_per_page: u64) -> Result<PageRequest, ApiError> {
        if self.page == 0 {
            return Err(ApiError::ValidationError(
                "page must be greater than zero".to_string(),
            ));
        }
        let per_page = self.per_page.unwrap_or(default_per_page);
        if per_page == 0 {
            return Err(ApiError::ValidationError(
                "per_page must be greater than zero".to_string(),
            ));
        }
        if per_page > max_per_page {
            return Err(ApiError::ValidationError(format!(
                "per_page cannot exceed {max_per_page}"
            )));
        }
        Ok(PageRequest::new(self.page, per_page))
    }
}

/// Free-text search shared by admin lists
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_uses_default_size() {
        let params = PaginationParams::default();
        assert_eq!(
            params.page_request(20, 100).unwrap(),
            PageRequest::new(1, 20)
        );
    }

    #[test]
    fn page_request_rejects_out_of_range_values() {
        let zero_page = PaginationParams {
            page: 0,
            per_page: None,
        };
        assert!(zero_page.page_request(20, 100).is_err());

        let too_big = PaginationParams {
            page: 1,
            per_page: Some(500),
        };
        assert!(too_big.page_request(20, 100).is_err());
    }
}
