use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the storefront core services.
///
/// Every error is client-scoped and non-fatal; the worst case is a stuck
/// checkout the user navigates away from. `is_recoverable` tells the UI
/// whether offering a retry makes sense.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A required input field is missing or malformed. Detected locally,
    /// before any network call is issued.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The order-creation request failed (transport error or non-2xx).
    /// The cart is preserved and the user may resubmit.
    #[error("Order creation failed: {0}")]
    OrderCreationFailed(String),

    /// The order was created but the payment provider returned no redirect
    /// URL. Distinct from `OrderCreationFailed` because the order now
    /// exists server-side.
    #[error("Payment initiation failed: {0}")]
    PaymentInitiationFailed(String),

    /// A payment-status query failed. Never surfaced as a blocking error;
    /// the polling loop logs it and continues.
    #[error("Payment status poll failed: {0}")]
    StatusPollError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Backend returned a non-success status for a request other than
    /// order creation.
    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ServiceError {
    /// Whether the UI should offer a retry of the same action.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ServiceError::OrderCreationFailed(_)
                | ServiceError::StatusPollError(_)
                | ServiceError::Transport(_)
        )
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        ServiceError::ValidationError(format!(
            "missing or invalid fields: {}",
            fields.join(", ")
        ))
    }
}

/// Serializable error payload handed to the UI layer for display.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable error kind (e.g. "validation_error")
    pub kind: String,
    /// Human-readable error description
    pub message: String,
    /// Whether retrying the same action can succeed
    pub recoverable: bool,
}

impl From<&ServiceError> for ErrorReport {
    fn from(error: &ServiceError) -> Self {
        let kind = match error {
            ServiceError::ValidationError(_) => "validation_error",
            ServiceError::OrderCreationFailed(_) => "order_creation_failed",
            ServiceError::PaymentInitiationFailed(_) => "payment_initiation_failed",
            ServiceError::StatusPollError(_) => "status_poll_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::InvalidOperation(_) => "invalid_operation",
            ServiceError::ExternalApiError(_) => "external_api_error",
            ServiceError::Transport(_) => "transport_error",
            ServiceError::ConfigError(_) => "config_error",
        };
        ErrorReport {
            kind: kind.to_string(),
            message: error.to_string(),
            recoverable: error.is_recoverable(),
        }
    }
}
