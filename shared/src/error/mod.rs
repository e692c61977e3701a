//! Unified error system for the Bluelight offer engine
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Condition errors
//! - 2xxx: Benefit errors
//! - 3xxx: Offer errors
//! - 4xxx: Voucher errors
//! - 5xxx: Basket errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::NotFound);
//! assert_eq!(err.code.code(), 3);
//!
//! let err = AppError::unknown_condition_type("bogus")
//!     .with_detail("condition_id", 12);
//! assert_eq!(err.code, ErrorCode::UnknownConditionType);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
