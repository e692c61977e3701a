//! Product Model

use serde::{Deserialize, Serialize};

/// Catalog product as seen by the offer engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    /// Products flagged as non-discountable never receive benefits
    #[serde(default = "default_true")]
    pub is_discountable: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category_ids: Vec::new(),
            is_discountable: true,
        }
    }
}
