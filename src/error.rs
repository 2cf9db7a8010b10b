use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// Application-level error type
#[derive(Debug)]
pub enum AppError {
    /// Database error
    Database(sqlx::Error),
    /// Validation error
    Validation(String),
    /// Not found error
    NotFound(String),
    /// Conflict error (e.g., duplicate slug)
    Conflict(String),
    /// Oracle and cache both empty; payment must not proceed
    PricingUnavailable(String),
    /// Wallet/transfer failure; no charge was recorded
    PaymentFailed(String),
    /// Rental record write failed after a successful transfer.
    /// The payment went through but no rental exists; the signature is
    /// included so the caller can reference the unreconciled charge.
    RentalNotRecorded { tx_signature: String, message: String },
    /// Chat access attempted without an unexpired rental
    RentalExpired(String),
    /// LLM provider failure
    Upstream(String),
    /// Internal server error
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
    meta: ErrorMeta,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorMeta {
    request_id: String,
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::PricingUnavailable(_) => "PRICING_UNAVAILABLE",
            Self::PaymentFailed(_) => "PAYMENT_FAILED",
            Self::RentalNotRecorded { .. } => "RENTAL_NOT_RECORDED",
            Self::RentalExpired(_) => "RENTAL_EXPIRED",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::RentalNotRecorded { tx_signature, .. } => {
                Some(serde_json::json!({ "tx_signature": tx_signature }))
            }
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {e}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::PricingUnavailable(msg) => write!(f, "Pricing unavailable: {msg}"),
            Self::PaymentFailed(msg) => write!(f, "Payment failed: {msg}"),
            Self::RentalNotRecorded { message, .. } => {
                write!(f, "Payment submitted but rental not recorded: {message}")
            }
            Self::RentalExpired(msg) => write!(f, "Rental expired: {msg}"),
            Self::Upstream(msg) => write!(f, "Upstream provider error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: ErrorBody {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
            meta: ErrorMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        };

        match self {
            Self::Database(_) | Self::Internal(_) | Self::RentalNotRecorded { .. } => {
                HttpResponse::InternalServerError().json(error_response)
            }
            Self::Validation(_) => HttpResponse::BadRequest().json(error_response),
            Self::NotFound(_) => HttpResponse::NotFound().json(error_response),
            Self::Conflict(_) => HttpResponse::Conflict().json(error_response),
            Self::PricingUnavailable(_) => {
                HttpResponse::ServiceUnavailable().json(error_response)
            }
            Self::PaymentFailed(_) | Self::Upstream(_) => {
                HttpResponse::BadGateway().json(error_response)
            }
            Self::RentalExpired(_) => HttpResponse::Forbidden().json(error_response),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}
