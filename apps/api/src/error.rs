//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Hearth POS                             │
//! │                                                                         │
//! │  Browser                     Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  POST /orders/{id}/settle                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler → BillingService                                        │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::VersionConflict ─────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule Error? ─── CoreError::InsufficientPayment ── ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── 422 { "code": "INSUFFICIENT_PAYMENT", "message": "..." }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use hearth_core::CoreError;
use hearth_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// This is the body the front-end receives when a request fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 6f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// switch (body.code) {
///   case 'INSUFFICIENT_PAYMENT':
///     keepPaymentModalOpen(body.message);
///     break;
///   case 'CONFLICT':
///     reloadOrder();
///     break;
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Discount outside its bounds (400)
    InvalidDiscount,

    /// Event not allowed in the current order or table state (409)
    InvalidTransition,

    /// Stale version or duplicate key (409)
    Conflict,

    /// Settlement attempted with a balance still due (422)
    InsufficientPayment,

    /// Business rule violated (422)
    BusinessRule,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::InvalidDiscount => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidTransition | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InsufficientPayment | ErrorCode::BusinessRule => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Result type for handlers and the billing service.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::VersionConflict { entity, id, .. } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} {} was changed by another terminal; reload and retry", entity, id),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored payload unreadable: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored record could not be read")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
///
/// Messages come from the core `Display` impls; only the code is chosen here.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ItemNotFound(_)
            | CoreError::PaymentNotFound(_)
            | CoreError::SupportSessionNotFound(_) => ErrorCode::NotFound,

            CoreError::InvalidDiscount { .. } => ErrorCode::InvalidDiscount,

            CoreError::NegativeQuantity { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::InvalidPaymentAmount { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,

            CoreError::InvalidTransition { .. }
            | CoreError::InvalidTableTransition { .. }
            | CoreError::OrderLocked { .. } => ErrorCode::InvalidTransition,

            CoreError::TableUnavailable { .. } => ErrorCode::Conflict,

            CoreError::InsufficientPayment { .. } => ErrorCode::InsufficientPayment,

            CoreError::EmptyOrder { .. }
            | CoreError::NoPendingItems { .. }
            | CoreError::PaymentInProgress { .. }
            | CoreError::NoPayments
            | CoreError::OrderTooLarge { .. }
            | CoreError::AmountTooLarge { .. } => ErrorCode::BusinessRule,
        };
        ApiError::new(code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = ?self.code, message = %self.message, "Request rejected");
        }
        (status, Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{Money, OrderStatus, SettlementEvent, ValidationError};

    #[test]
    fn test_core_errors_map_to_statuses() {
        let short = ApiError::from(CoreError::InsufficientPayment {
            paid: Money::from_paise(30_000),
            grand_total: Money::from_paise(50_000),
            balance_due: Money::from_paise(20_000),
        });
        assert_eq!(short.code, ErrorCode::InsufficientPayment);
        assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let settled = ApiError::from(CoreError::InvalidTransition {
            from: OrderStatus::Settled,
            event: SettlementEvent::Void,
        });
        assert_eq!(settled.status(), StatusCode::CONFLICT);

        let invalid = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "reason".into(),
        }));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.message, "Validation error: reason is required");
    }

    #[test]
    fn test_db_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(DbError::conflict("Order", "o-1", 3)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DbError::not_found("Table", "t-9")).status(),
            StatusCode::NOT_FOUND
        );
        let internal = ApiError::from(DbError::QueryFailed("near \"SELEC\"".into()));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.message, "Database operation failed");
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ApiError::not_found("Order", "abc")).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Order not found: abc");
    }
}
