//! Benefit Row Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stored benefit row
///
/// `proxy_class` is the type tag resolved into a concrete benefit, for
/// example `percentage`, `multibuy` or `shipping_absolute`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenefitRow {
    pub id: i64,
    pub proxy_class: String,
    #[serde(default)]
    pub range_id: Option<i64>,
    /// Percentage (30 = 30%) or amount depending on the benefit type
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub max_affected_items: Option<u32>,
    /// Hard cap on the discount of one basket application
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub subbenefit_ids: Vec<i64>,
}

impl BenefitRow {
    pub fn new(id: i64, proxy_class: impl Into<String>) -> Self {
        Self {
            id,
            proxy_class: proxy_class.into(),
            range_id: None,
            value: None,
            max_affected_items: None,
            max_discount: None,
            subbenefit_ids: Vec::new(),
        }
    }

    pub fn with_range(mut self, range_id: i64) -> Self {
        self.range_id = Some(range_id);
        self
    }

    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = Some(value);
        self
    }
}
