//! Error types

use super::codes::ErrorCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the primary error type of the offer engine, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details for debugging
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (offending ids, type tags, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create an already exists error
    pub fn already_exists(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::AlreadyExists, format!("{} already exists", r))
            .with_detail("resource", r)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create the classification error raised for an unrecognised condition tag
    pub fn unknown_condition_type(tag: impl Into<String>) -> Self {
        let t = tag.into();
        Self::with_message(
            ErrorCode::UnknownConditionType,
            format!("Unrecognised condition type ({})", t),
        )
        .with_detail("proxy_class", t)
    }

    /// Create the classification error raised for an unrecognised benefit tag
    pub fn unknown_benefit_type(tag: impl Into<String>) -> Self {
        let t = tag.into();
        Self::with_message(
            ErrorCode::UnknownBenefitType,
            format!("Unrecognised benefit type ({})", t),
        )
        .with_detail("proxy_class", t)
    }

    /// Create an invalid benefit configuration error
    pub fn benefit_invalid(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::BenefitInvalid, msg)
    }

    /// Create an incompatible compound benefit error
    pub fn incompatible_benefits() -> Self {
        Self::new(ErrorCode::IncompatibleBenefits)
    }

    /// Create a tax unknown error for a basket line
    pub fn tax_unknown(line_id: i64) -> Self {
        Self::with_message(
            ErrorCode::TaxUnknown,
            "A price breakdown can only be determined when taxes are known",
        )
        .with_detail("line_id", line_id)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_message(ErrorCode::SerializationError, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_message(ErrorCode::IoError, err.to_string())
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_message() {
        let err = AppError::new(ErrorCode::IncompatibleBenefits);
        assert_eq!(err.code, ErrorCode::IncompatibleBenefits);
        assert_eq!(err.to_string(), "Can not combine offer benefits of differing types");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_with_detail() {
        let err = AppError::unknown_condition_type("bogus");
        assert_eq!(err.code, ErrorCode::UnknownConditionType);
        let details = err.details.unwrap();
        assert_eq!(details.get("proxy_class"), Some(&Value::from("bogus")));
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Range 7");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Range 7 not found");
    }

    #[test]
    fn test_from_serde_error() {
        let parse: Result<i32, _> = serde_json::from_str("nope");
        let err: AppError = parse.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::SerializationError);
    }
}
