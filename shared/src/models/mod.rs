//! Data models
//!
//! Rows loaded from the offer catalog (JSON scenario files or an embedding
//! application). All IDs are `i64`, timestamps are Unix millis and money is
//! [`rust_decimal::Decimal`].

pub mod application;
pub mod benefit;
pub mod condition;
pub mod customer;
pub mod offer;
pub mod offer_group;
pub mod product;
pub mod range;
pub mod voucher;

// Re-exports
pub use application::*;
pub use benefit::*;
pub use condition::*;
pub use customer::*;
pub use offer::*;
pub use offer_group::*;
pub use product::*;
pub use range::*;
pub use voucher::*;
