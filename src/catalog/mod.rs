//! Catalog storage and export
//!
//! # Modules
//!
//! - [`db`] - Connection pool and idempotent schema creation
//! - [`models`] - `Category` and `Item` rows with their queries
//! - [`export`] - The JSON/XML catalog dump

pub mod db;
pub mod export;
pub mod models;

pub use db::CatalogDb;
pub use models::{Category, Item, ItemData};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::utils::responses::ResponseBuilder;

/// Errors raised by catalog handlers
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Duplicate(String),
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl CatalogError {
    #[must_use]
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Map a failed insert, turning unique violations into [`CatalogError::Duplicate`]
    #[must_use]
    pub fn from_insert(err: sqlx::Error, duplicate_message: &str) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Duplicate(duplicate_message.to_string())
            }
            other => Self::Database(other),
        }
    }
}

impl ResponseError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Database(e) => {
                log::error!("Catalog database error: {e}");
                ResponseBuilder::internal_server_error().build()
            }
            Self::NotFound(_) => ResponseBuilder::not_found()
                .with_message(&self.to_string())
                .build(),
            Self::Duplicate(message) => ResponseBuilder::conflict()
                .with_error_code("duplicate")
                .with_message(message)
                .build(),
            Self::Validation { field, reason } => ResponseBuilder::invalid_field(field, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            CatalogError::NotFound("Item").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CatalogError::Duplicate("exists".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CatalogError::validation("title", "is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CatalogError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_unique_violation_maps_to_duplicate() {
        let db = CatalogDb::in_memory().await.unwrap();
        Category::create(&db.pool, "Soccer").await.unwrap();
        let err = Category::create(&db.pool, "Soccer").await.unwrap_err();
        let mapped = CatalogError::from_insert(err, "Category already exists");
        assert!(matches!(mapped, CatalogError::Duplicate(_)));

        let mapped = CatalogError::from_insert(sqlx::Error::RowNotFound, "unused");
        assert!(matches!(mapped, CatalogError::Database(_)));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(CatalogError::NotFound("Category").to_string(), "Category not found");
    }
}
