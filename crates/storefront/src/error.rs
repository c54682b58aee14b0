//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; every error response is a JSON body with a
//! `message` field.
//!
//! Status taxonomy: validation failures are 400, a missing entity is 404 on
//! reads but 400 when referenced inside a write, duplicate unique keys are
//! 409, and dependency failures (mail, storage) are 500 with the triggering
//! error's message surfaced.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, CatalogError, OrderError, UploadError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed outside a service flow.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Order placement or lookup failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image upload failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The JSON body carried by every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

/// Map a repository error that escaped a service flow.
fn repository_response(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::Conflict(message) => (StatusCode::CONFLICT, message.clone()),
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_owned(),
        ),
    }
}

impl AppError {
    /// The response status and client-facing message for this error.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_response(err),

            Self::Order(err) => match err {
                OrderError::Repository(inner) => repository_response(inner),
                // Everything else is a client problem with the submitted
                // order - including references to products/addresses that
                // do not exist (not-found inside a write).
                other => (StatusCode::BAD_REQUEST, other.to_string()),
            },

            Self::Cart(err) => match err {
                CartError::CartNotFound | CartError::LineNotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                CartError::Repository(inner) => repository_response(inner),
                other => (StatusCode::BAD_REQUEST, other.to_string()),
            },

            Self::Catalog(err) => match err {
                CatalogError::Repository(inner) => repository_response(inner),
                other => (StatusCode::BAD_REQUEST, other.to_string()),
            },

            Self::Auth(err) => match err {
                AuthError::MobileLinked => (StatusCode::CONFLICT, err.to_string()),
                // Mail is a dependency: surface the transport's message.
                AuthError::Delivery(inner) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, inner.to_string())
                }
                AuthError::Token(_) | AuthError::Repository(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                ),
                other => (StatusCode::BAD_REQUEST, other.to_string()),
            },

            // Storage is a dependency: surface the triggering error.
            Self::Upload(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),

            Self::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use driftwood_core::ProductId;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_errors_are_400() {
        assert_eq!(
            status_of(AppError::BadRequest("userId is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Order(OrderError::EmptyItems)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Cart(CartError::InvalidQuantity)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_missing_reference_inside_write_is_400() {
        assert_eq!(
            status_of(AppError::Order(OrderError::ProductNotFound(ProductId::new(9)))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Catalog(CatalogError::CategoryNotFound)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Cart(CartError::ProductNotFound)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_missing_entity_on_read_is_404() {
        assert_eq!(
            status_of(AppError::NotFound("Order not found".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Cart(CartError::LineNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflicts_are_409() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::MobileLinked)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::Conflict(
                "Category already exists".into()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_insufficient_stock_is_400_with_count_in_message() {
        let err = AppError::Order(OrderError::InsufficientStock {
            name: "Oak Shelf".into(),
            available: 5,
        });
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Only 5 left for Oak Shelf");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let (_, message) = AppError::Internal("connection refused".into()).status_and_message();
        assert_eq!(message, "Internal server error");

        let (_, message) =
            AppError::Database(RepositoryError::DataCorruption("bad email".into()))
                .status_and_message();
        assert_eq!(message, "Internal server error");
    }
}
