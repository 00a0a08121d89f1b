//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use stock_ledger_engine::{AdjustmentError, QueryError, ReversalError};
use stock_ledger_store::LedgerError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A movement referenced an unregistered product.
    #[error("unknown product: {product_id}")]
    UnknownProduct {
        /// The product id that was not found.
        product_id: String,
    },

    /// A batch was submitted with no movements.
    #[error("empty batch")]
    EmptyBatch,

    /// The batch to reverse was never applied.
    #[error("batch not found: {batch_id}")]
    BatchNotFound {
        /// The batch id that was not found.
        batch_id: String,
    },

    /// The batch has already been reversed.
    #[error("batch {batch_id} already reversed by {reversed_by}")]
    AlreadyReversed {
        /// The batch whose reversal was attempted again.
        batch_id: String,
        /// The batch that already reverses it.
        reversed_by: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::UnknownProduct { product_id } => (
                StatusCode::BAD_REQUEST,
                "unknown_product",
                self.to_string(),
                Some(serde_json::json!({ "product_id": product_id })),
            ),
            Self::EmptyBatch => (
                StatusCode::BAD_REQUEST,
                "empty_batch",
                self.to_string(),
                None,
            ),
            Self::BatchNotFound { batch_id } => (
                StatusCode::NOT_FOUND,
                "batch_not_found",
                self.to_string(),
                Some(serde_json::json!({ "batch_id": batch_id })),
            ),
            Self::AlreadyReversed {
                batch_id,
                reversed_by,
            } => (
                StatusCode::CONFLICT,
                "already_reversed",
                self.to_string(),
                Some(serde_json::json!({
                    "batch_id": batch_id,
                    "reversed_by": reversed_by
                })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownProduct { product_id } => Self::UnknownProduct {
                product_id: product_id.to_string(),
            },
            LedgerError::EmptyBatch => Self::EmptyBatch,
            LedgerError::BatchNotFound { batch_id } => Self::BatchNotFound {
                batch_id: batch_id.to_string(),
            },
            LedgerError::AlreadyReversed {
                batch_id,
                reversed_by,
            } => Self::AlreadyReversed {
                batch_id: batch_id.to_string(),
                reversed_by: reversed_by.to_string(),
            },
            LedgerError::DuplicateBatch { batch_id } => {
                // The engine replays duplicates; a duplicate surfacing here is
                // a programming error on the write path.
                Self::Internal(format!("unhandled duplicate batch: {batch_id}"))
            }
            LedgerError::Database(msg) | LedgerError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<AdjustmentError> for ApiError {
    fn from(err: AdjustmentError) -> Self {
        match err {
            AdjustmentError::UnknownProduct { product_id } => Self::UnknownProduct {
                product_id: product_id.to_string(),
            },
            AdjustmentError::EmptyBatch => Self::EmptyBatch,
            AdjustmentError::Storage(e) => e.into(),
        }
    }
}

impl From<ReversalError> for ApiError {
    fn from(err: ReversalError) -> Self {
        match err {
            ReversalError::BatchNotFound { batch_id } => Self::BatchNotFound {
                batch_id: batch_id.to_string(),
            },
            ReversalError::AlreadyReversed {
                batch_id,
                reversed_by,
            } => Self::AlreadyReversed {
                batch_id: batch_id.to_string(),
                reversed_by: reversed_by.to_string(),
            },
            ReversalError::Adjustment(e) => e.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownProduct { product_id } => {
                Self::NotFound(format!("product not found: {product_id}"))
            }
            QueryError::Storage(e) => e.into(),
        }
    }
}
