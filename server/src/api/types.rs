//! Shared API types
//!
//! Error envelope, pagination and sorting used by the movie endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationError;

use crate::domain::table::{ColumnSort, SortDirection};

/// Maximum items per page
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Default page number
pub const DEFAULT_PAGE: u32 = 1;
/// Default items per page
pub const DEFAULT_LIMIT: u32 = 10;

/// Validator function for page parameter
pub fn validate_page(page: u32) -> Result<(), ValidationError> {
    if page < 1 {
        return Err(ValidationError::new("page_min").with_message("Page must be >= 1".into()));
    }
    Ok(())
}

/// Validator function for limit parameter
pub fn validate_limit(limit: u32) -> Result<(), ValidationError> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::new("limit_range")
            .with_message(format!("Limit must be between 1 and {}", MAX_PAGE_LIMIT).into()));
    }
    Ok(())
}

/// Standard API error response
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { code: String, message: String },
    #[error("{message}")]
    BadGateway { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn from_catalog(e: crate::data::CatalogError) -> Self {
        tracing::error!(error = %e, "Catalog error");
        Self::BadGateway {
            message: format!("Catalog request failed: {}", e),
        }
    }

    pub fn from_filter(e: crate::domain::filters::FilterError) -> Self {
        Self::BadRequest {
            code: "FILTER_KIND_MISMATCH".to_string(),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::BadGateway { message } => (
                StatusCode::BAD_GATEWAY,
                "bad_gateway",
                "CATALOG_UNAVAILABLE".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

pub fn default_page() -> u32 {
    DEFAULT_PAGE
}

pub fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Pagination metadata in response
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        Self {
            page,
            limit,
            total_items,
            total_pages: total_items.div_ceil(limit.max(1) as u64),
        }
    }
}

/// OrderBy query parameter parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    /// Parse `column`, `column:asc` or `column:desc`; bare columns sort descending
    pub fn parse(s: &str, allowed_columns: &[&str]) -> Result<Self, ApiError> {
        let parts: Vec<&str> = s.split(':').collect();
        let (column, direction) = match parts.as_slice() {
            [col] => (*col, SortDirection::Desc),
            [col, "asc"] => (*col, SortDirection::Asc),
            [col, "desc"] => (*col, SortDirection::Desc),
            _ => {
                return Err(ApiError::bad_request(
                    "INVALID_ORDER",
                    "Invalid order_by format. Use 'column' or 'column:asc' or 'column:desc'",
                ));
            }
        };
        if !allowed_columns.contains(&column) {
            return Err(ApiError::bad_request(
                "INVALID_ORDER_COLUMN",
                format!("Cannot order by: {}", column),
            ));
        }
        Ok(Self {
            column: column.to_string(),
            direction,
        })
    }
}

impl From<OrderBy> for ColumnSort {
    fn from(order: OrderBy) -> Self {
        Self {
            column: order.column,
            direction: order.direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_parse() {
        let allowed = ["title", "popularity"];

        let order = OrderBy::parse("popularity", &allowed).unwrap();
        assert_eq!(order.direction, SortDirection::Desc);

        let order = OrderBy::parse("title:asc", &allowed).unwrap();
        assert_eq!(order.column, "title");
        assert_eq!(order.direction, SortDirection::Asc);

        assert!(matches!(
            OrderBy::parse("title:up", &allowed),
            Err(ApiError::BadRequest { code, .. }) if code == "INVALID_ORDER"
        ));
        assert!(matches!(
            OrderBy::parse("overview", &allowed),
            Err(ApiError::BadRequest { code, .. }) if code == "INVALID_ORDER_COLUMN"
        ));
    }

    #[test]
    fn test_pagination_meta_total_pages() {
        assert_eq!(PaginationMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(2, 10, 21).total_pages, 3);
    }

    #[test]
    fn test_validators() {
        assert!(validate_page(0).is_err());
        assert!(validate_page(7).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(MAX_PAGE_LIMIT).is_ok());
        assert!(validate_limit(MAX_PAGE_LIMIT + 1).is_err());
    }

    #[tokio::test]
    async fn test_api_error_envelope() {
        let response = ApiError::bad_request("INVALID_ORDER", "nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "bad_request");
        assert_eq!(json["code"], "INVALID_ORDER");
        assert_eq!(json["message"], "nope");
    }
}
