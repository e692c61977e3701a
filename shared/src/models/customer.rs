//! Customer Model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The shopper a basket belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Customer {
    /// `None` for anonymous shoppers
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub group_ids: Vec<i64>,
    /// Past applications per offer id
    #[serde(default)]
    pub offer_applications: HashMap<i64, u32>,
}

impl Customer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(id: i64, group_ids: Vec<i64>) -> Self {
        Self {
            id: Some(id),
            is_authenticated: true,
            group_ids,
            offer_applications: HashMap::new(),
        }
    }

    pub fn is_member_of_any(&self, group_ids: &[i64]) -> bool {
        self.group_ids.iter().any(|g| group_ids.contains(g))
    }

    /// Past applications of an offer, `None` for anonymous shoppers
    pub fn applications_of(&self, offer_id: i64) -> Option<u32> {
        if !self.is_authenticated {
            return None;
        }
        Some(self.offer_applications.get(&offer_id).copied().unwrap_or(0))
    }
}
