//! Voucher Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::application::VoucherRef;

/// How often a voucher may be redeemed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherUsage {
    SingleUse,
    #[default]
    MultiUse,
    OncePerCustomer,
}

/// One redemption of a voucher by a placed order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoucherApplication {
    pub order_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub order_status: String,
}

/// Voucher entity
///
/// A parent voucher owns a set of child codes. Children copy the parent's
/// usage, window, group restriction and offers, and always show the
/// parent's name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voucher {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub usage: VoucherUsage,
    /// Start of the validity window (Unix millis)
    pub start_datetime: i64,
    /// End of the validity window (Unix millis)
    pub end_datetime: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub limit_usage_by_group: bool,
    #[serde(default)]
    pub group_ids: Vec<i64>,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub offer_ids: Vec<i64>,
    #[serde(default)]
    pub num_basket_additions: u32,
    #[serde(default)]
    pub num_orders: u32,
    #[serde(default)]
    pub total_discount: Decimal,
    #[serde(default)]
    pub applications: Vec<VoucherApplication>,
}

impl Voucher {
    /// Multi-use voucher valid over `[start_datetime, end_datetime]`
    pub fn new(
        id: i64,
        name: impl Into<String>,
        code: impl Into<String>,
        start_datetime: i64,
        end_datetime: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
            usage: VoucherUsage::MultiUse,
            start_datetime,
            end_datetime,
            parent_id: None,
            limit_usage_by_group: false,
            group_ids: Vec::new(),
            is_suspended: false,
            offer_ids: Vec::new(),
            num_basket_additions: 0,
            num_orders: 0,
            total_discount: Decimal::ZERO,
            applications: Vec::new(),
        }
    }

    /// Whether `now` (Unix millis) falls inside the validity window
    pub fn is_active(&self, now: i64) -> bool {
        self.start_datetime <= now && now <= self.end_datetime
    }

    pub fn is_child(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Reference carried by the offers this voucher brings into a basket
    pub fn voucher_ref(&self) -> VoucherRef {
        VoucherRef {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}
