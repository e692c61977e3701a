//! Condition Row Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Boolean operator joining the children of a compound condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    /// Word used when joining human-readable names
    pub fn word(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Stored condition row
///
/// `proxy_class` is the type tag resolved into a concrete condition
/// (`count`, `coverage`, `value`, `tax_inclusive_value` or `compound`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionRow {
    pub id: i64,
    pub proxy_class: String,
    #[serde(default)]
    pub range_id: Option<i64>,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub conjunction: Conjunction,
    #[serde(default)]
    pub subcondition_ids: Vec<i64>,
}

impl ConditionRow {
    pub fn new(id: i64, proxy_class: impl Into<String>) -> Self {
        Self {
            id,
            proxy_class: proxy_class.into(),
            range_id: None,
            value: None,
            conjunction: Conjunction::And,
            subcondition_ids: Vec::new(),
        }
    }

    pub fn with_range(mut self, range_id: i64, value: Decimal) -> Self {
        self.range_id = Some(range_id);
        self.value = Some(value);
        self
    }

    pub fn with_children(mut self, conjunction: Conjunction, ids: Vec<i64>) -> Self {
        self.conjunction = conjunction;
        self.subcondition_ids = ids;
        self
    }
}
