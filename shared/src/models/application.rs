//! Applied Offer Model
//!
//! Snapshot of one offer's applications to a basket, in the order the
//! offers first applied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What part of the order a benefit result affects
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    Basket,
    Shipping,
    PostOrder,
}

/// Voucher that brought an offer into the basket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoucherRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// One entry of an offer applications collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferApplication {
    pub offer_id: i64,
    pub offer_name: String,
    #[serde(default)]
    pub offer_description: String,
    #[serde(default)]
    pub voucher: Option<VoucherRef>,
    /// Number of successful applications
    pub freq: u32,
    /// Accumulated discount of every application
    pub discount: Decimal,
    pub kind: ResultKind,
    /// Post-order action descriptions
    #[serde(default)]
    pub descriptions: Vec<String>,
    pub is_hidden: bool,
    /// Position of the offer's first successful application
    pub index: usize,
}
