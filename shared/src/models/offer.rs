//! Conditional Offer Model

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where an offer comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferType {
    /// Available to every basket
    Site,
    /// Only reachable through a voucher added to the basket
    Voucher,
    /// Available to customers in the offer's user groups
    User,
    /// Injected for one session by the embedding application
    Session,
}

/// Offer lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    #[default]
    Open,
    Suspended,
    Consumed,
}

/// A line of [`ConditionalOffer::availability_restrictions`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityRestriction {
    pub description: String,
    pub is_satisfied: bool,
}

/// Conditional offer entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionalOffer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub description: String,
    pub offer_type: OfferType,
    #[serde(default)]
    pub status: OfferStatus,
    /// Higher priority offers apply first inside their group
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub offer_group_id: Option<i64>,
    /// Exclusive offers never share basket items with other offers
    #[serde(default = "default_true")]
    pub exclusive: bool,
    /// Start of the availability window (Unix millis)
    #[serde(default)]
    pub start_datetime: Option<i64>,
    /// End of the availability window (Unix millis)
    #[serde(default)]
    pub end_datetime: Option<i64>,
    #[serde(default)]
    pub max_basket_applications: Option<u32>,
    #[serde(default)]
    pub max_user_applications: Option<u32>,
    #[serde(default)]
    pub max_global_applications: Option<u32>,
    #[serde(default)]
    pub num_applications: u32,
    #[serde(default)]
    pub total_discount: Decimal,
    #[serde(default)]
    pub num_orders: u32,
    #[serde(default = "default_true")]
    pub affects_cosmetic_pricing: bool,
    /// User groups eligible for `User` offers
    #[serde(default)]
    pub user_group_ids: Vec<i64>,
    pub condition_id: i64,
    pub benefit_id: i64,
}

fn default_true() -> bool {
    true
}

impl ConditionalOffer {
    /// Open, exclusive site offer with no limits
    pub fn new(id: i64, name: impl Into<String>, condition_id: i64, benefit_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            short_name: String::new(),
            description: String::new(),
            offer_type: OfferType::Site,
            status: OfferStatus::Open,
            priority: 0,
            offer_group_id: None,
            exclusive: true,
            start_datetime: None,
            end_datetime: None,
            max_basket_applications: None,
            max_user_applications: None,
            max_global_applications: None,
            num_applications: 0,
            total_discount: Decimal::ZERO,
            num_orders: 0,
            affects_cosmetic_pricing: true,
            user_group_ids: Vec::new(),
            condition_id,
            benefit_id,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == OfferStatus::Open
    }

    /// Whether the offer can be applied at `now` (Unix millis)
    pub fn is_available(&self, now: i64) -> bool {
        if !self.is_open() {
            return false;
        }
        if self.start_datetime.is_some_and(|start| now < start) {
            return false;
        }
        if self.end_datetime.is_some_and(|end| now > end) {
            return false;
        }
        match self.max_global_applications {
            Some(max) => self.num_applications < max,
            None => true,
        }
    }

    /// Maximum number of times this offer may apply to one basket
    ///
    /// `user_applications` is the number of times the current user already
    /// used the offer, `None` for anonymous users.
    pub fn get_max_applications(&self, user_applications: Option<u32>, cap: u32) -> u32 {
        let mut limits = vec![cap];
        if let (Some(used), Some(max)) = (user_applications, self.max_user_applications) {
            limits.push(max.saturating_sub(used));
        }
        if let Some(max) = self.max_basket_applications {
            limits.push(max);
        }
        if let Some(max) = self.max_global_applications {
            limits.push(max.saturating_sub(self.num_applications));
        }
        limits.into_iter().min().unwrap_or(cap)
    }

    /// Record a placed order's use of this offer
    pub fn record_usage(&mut self, freq: u32, discount: Decimal) {
        self.num_applications += freq;
        self.total_discount += discount;
        self.num_orders += 1;
    }

    /// Human-readable restrictions, given the user group names of a `User` offer
    pub fn availability_restrictions(&self, user_group_names: &[String]) -> Vec<AvailabilityRestriction> {
        let mut restrictions = Vec::new();
        if let Some(max) = self.max_global_applications {
            restrictions.push(AvailabilityRestriction {
                description: format!("Limited to {} uses", max),
                is_satisfied: self.num_applications < max,
            });
        }
        if let Some(max) = self.max_user_applications {
            restrictions.push(AvailabilityRestriction {
                description: format!("Limited to {} uses per user", max),
                is_satisfied: true,
            });
        }
        if let Some(max) = self.max_basket_applications {
            restrictions.push(AvailabilityRestriction {
                description: format!("Limited to {} uses per basket", max),
                is_satisfied: true,
            });
        }
        let now = Utc::now().timestamp_millis();
        if let Some(start) = self.start_datetime {
            restrictions.push(AvailabilityRestriction {
                description: format!("Available from {}", format_millis(start)),
                is_satisfied: start <= now,
            });
        }
        if let Some(end) = self.end_datetime {
            restrictions.push(AvailabilityRestriction {
                description: format!("Available until {}", format_millis(end)),
                is_satisfied: now <= end,
            });
        }
        if self.offer_type == OfferType::User {
            restrictions.push(AvailabilityRestriction {
                description: format!(
                    "Offer is limited to user groups: {}",
                    user_group_names.join(", ")
                ),
                is_satisfied: true,
            });
        }
        restrictions
    }
}

fn format_millis(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => millis.to_string(),
    }
}
