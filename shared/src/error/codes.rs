//! Unified error codes for the Bluelight offer engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Condition errors
//! - 2xxx: Benefit errors
//! - 3xxx: Offer and offer group errors
//! - 4xxx: Voucher errors
//! - 5xxx: Basket errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they survive JSON
/// round trips through scenario files and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Condition ====================
    /// Condition row not found
    ConditionNotFound = 1001,
    /// Condition type tag is not a known condition class
    UnknownConditionType = 1002,
    /// Condition requires a range
    ConditionRangeRequired = 1003,
    /// Condition requires a positive value
    ConditionValueRequired = 1004,
    /// Compound condition carries a range or value
    CompoundConditionInvalid = 1005,
    /// Compound condition references itself through its children
    ConditionCycle = 1006,

    // ==================== 2xxx: Benefit ====================
    /// Benefit row not found
    BenefitNotFound = 2001,
    /// Benefit type tag is not a known benefit class
    UnknownBenefitType = 2002,
    /// Benefit configuration is invalid for its type
    BenefitInvalid = 2003,
    /// Compound benefit children produced results of different kinds
    IncompatibleBenefits = 2004,
    /// Compound benefit references itself through its children
    BenefitCycle = 2005,

    // ==================== 3xxx: Offer ====================
    /// Offer not found
    OfferNotFound = 3001,
    /// Offer group not found
    OfferGroupNotFound = 3002,
    /// Another offer group already uses this priority
    DuplicateGroupPriority = 3003,
    /// Offer is not available
    OfferUnavailable = 3004,
    /// Range not found
    RangeNotFound = 3005,

    // ==================== 4xxx: Voucher ====================
    /// Voucher not found
    VoucherNotFound = 4001,
    /// Voucher code already exists
    VoucherCodeExists = 4002,
    /// Child vouchers can not have children
    NestedChildVoucher = 4003,
    /// Could not generate a unique child code
    ChildCodeExhausted = 4004,
    /// Voucher is not available to the customer
    VoucherUnavailable = 4005,

    // ==================== 5xxx: Basket ====================
    /// Basket line not found
    LineNotFound = 5001,
    /// Line tax is unknown
    TaxUnknown = 5002,
    /// Quantity must be positive
    InvalidQuantity = 5003,
    /// Product not found
    ProductNotFound = 5004,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Configuration error
    ConfigError = 9002,
    /// Serialization error
    SerializationError = 9003,
    /// IO error
    IoError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Condition
            ErrorCode::ConditionNotFound => "Condition not found",
            ErrorCode::UnknownConditionType => "Unrecognised condition type",
            ErrorCode::ConditionRangeRequired => "Conditions must have a range",
            ErrorCode::ConditionValueRequired => "Conditions must have a value",
            ErrorCode::CompoundConditionInvalid => {
                "Compound conditions should not have a range or a value"
            }
            ErrorCode::ConditionCycle => "Compound condition contains itself",

            // Benefit
            ErrorCode::BenefitNotFound => "Benefit not found",
            ErrorCode::UnknownBenefitType => "Unrecognised benefit type",
            ErrorCode::BenefitInvalid => "Benefit configuration is invalid",
            ErrorCode::IncompatibleBenefits => {
                "Can not combine offer benefits of differing types"
            }
            ErrorCode::BenefitCycle => "Compound benefit contains itself",

            // Offer
            ErrorCode::OfferNotFound => "Offer not found",
            ErrorCode::OfferGroupNotFound => "Offer group not found",
            ErrorCode::DuplicateGroupPriority => "Offer group priority is already in use",
            ErrorCode::OfferUnavailable => "Offer is not available",
            ErrorCode::RangeNotFound => "Range not found",

            // Voucher
            ErrorCode::VoucherNotFound => "Voucher not found",
            ErrorCode::VoucherCodeExists => "Voucher code already exists",
            ErrorCode::NestedChildVoucher => "Can not create children for a child voucher",
            ErrorCode::ChildCodeExhausted => "Could not generate a unique child code",
            ErrorCode::VoucherUnavailable => "This voucher is not available",

            // Basket
            ErrorCode::LineNotFound => "Basket line not found",
            ErrorCode::TaxUnknown => "Line tax is unknown",
            ErrorCode::InvalidQuantity => "Quantity must be positive",
            ErrorCode::ProductNotFound => "Product not found",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::SerializationError => "Serialization error",
            ErrorCode::IoError => "IO error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Condition
            1001 => Ok(ErrorCode::ConditionNotFound),
            1002 => Ok(ErrorCode::UnknownConditionType),
            1003 => Ok(ErrorCode::ConditionRangeRequired),
            1004 => Ok(ErrorCode::ConditionValueRequired),
            1005 => Ok(ErrorCode::CompoundConditionInvalid),
            1006 => Ok(ErrorCode::ConditionCycle),

            // Benefit
            2001 => Ok(ErrorCode::BenefitNotFound),
            2002 => Ok(ErrorCode::UnknownBenefitType),
            2003 => Ok(ErrorCode::BenefitInvalid),
            2004 => Ok(ErrorCode::IncompatibleBenefits),
            2005 => Ok(ErrorCode::BenefitCycle),

            // Offer
            3001 => Ok(ErrorCode::OfferNotFound),
            3002 => Ok(ErrorCode::OfferGroupNotFound),
            3003 => Ok(ErrorCode::DuplicateGroupPriority),
            3004 => Ok(ErrorCode::OfferUnavailable),
            3005 => Ok(ErrorCode::RangeNotFound),

            // Voucher
            4001 => Ok(ErrorCode::VoucherNotFound),
            4002 => Ok(ErrorCode::VoucherCodeExists),
            4003 => Ok(ErrorCode::NestedChildVoucher),
            4004 => Ok(ErrorCode::ChildCodeExhausted),
            4005 => Ok(ErrorCode::VoucherUnavailable),

            // Basket
            5001 => Ok(ErrorCode::LineNotFound),
            5002 => Ok(ErrorCode::TaxUnknown),
            5003 => Ok(ErrorCode::InvalidQuantity),
            5004 => Ok(ErrorCode::ProductNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::ConfigError),
            9003 => Ok(ErrorCode::SerializationError),
            9004 => Ok(ErrorCode::IoError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
