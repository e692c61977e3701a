//! Vouchers: the store of parent and child codes plus availability rules

pub mod rules;
pub mod store;

pub use rules::{RuleContext, VoucherRule, check_rules};
pub use store::VoucherStore;
