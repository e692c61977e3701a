//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Condition errors
/// - 2xxx: Benefit errors
/// - 3xxx: Offer errors
/// - 4xxx: Voucher errors
/// - 5xxx: Basket errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Condition errors (1xxx)
    Condition,
    /// Benefit errors (2xxx)
    Benefit,
    /// Offer errors (3xxx)
    Offer,
    /// Voucher errors (4xxx)
    Voucher,
    /// Basket errors (5xxx)
    Basket,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Condition,
            2000..3000 => Self::Benefit,
            3000..4000 => Self::Offer,
            4000..5000 => Self::Voucher,
            5000..6000 => Self::Basket,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Condition => "condition",
            Self::Benefit => "benefit",
            Self::Offer => "offer",
            Self::Voucher => "voucher",
            Self::Basket => "basket",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1002), ErrorCategory::Condition);
        assert_eq!(ErrorCategory::from_code(2004), ErrorCategory::Benefit);
        assert_eq!(ErrorCategory::from_code(3003), ErrorCategory::Offer);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Voucher);
        assert_eq!(ErrorCategory::from_code(5002), ErrorCategory::Basket);
        assert_eq!(ErrorCategory::from_code(7000), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::UnknownConditionType.category(),
            ErrorCategory::Condition
        );
        assert_eq!(
            ErrorCode::IncompatibleBenefits.category(),
            ErrorCategory::Benefit
        );
        assert_eq!(ErrorCode::VoucherCodeExists.category(), ErrorCategory::Voucher);
        assert_eq!(ErrorCode::TaxUnknown.category(), ErrorCategory::Basket);
        assert_eq!(ErrorCategory::Voucher.name(), "voucher");
    }
}
