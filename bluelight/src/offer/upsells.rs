//! Offer upsells
//!
//! Messages telling the customer what is missing to qualify for an offer
//! whose condition is only partially satisfied.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Conjunction, ConditionalOffer, Product, ProductRange};

use crate::utils::money::{format_currency, human_readable_conjoin};

/// Offer an upsell belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsellOffer {
    pub offer_id: i64,
    pub offer_name: String,
    pub group_priority: Option<i32>,
    pub offer_priority: i32,
}

impl UpsellOffer {
    pub fn from_offer(offer: &ConditionalOffer) -> Self {
        Self {
            offer_id: offer.id,
            offer_name: offer.name.clone(),
            group_priority: None,
            offer_priority: offer.priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfferUpsell {
    /// Add more units from a range (count conditions)
    Quantity {
        offer: UpsellOffer,
        range: ProductRange,
        delta: Decimal,
    },
    /// Add more distinct products from a range (coverage conditions)
    Coverage {
        offer: UpsellOffer,
        range: ProductRange,
        delta: Decimal,
    },
    /// Spend more on a range (value conditions)
    Amount {
        offer: UpsellOffer,
        range: ProductRange,
        delta: Decimal,
        currency: String,
    },
    Compound {
        offer: UpsellOffer,
        conjunction: Conjunction,
        subupsells: Vec<OfferUpsell>,
    },
}

impl OfferUpsell {
    pub fn offer(&self) -> &UpsellOffer {
        match self {
            Self::Quantity { offer, .. }
            | Self::Coverage { offer, .. }
            | Self::Amount { offer, .. }
            | Self::Compound { offer, .. } => offer,
        }
    }

    /// Set the priority of the offer group the upsell's offer belongs to
    pub fn with_group_priority(mut self, priority: Option<i32>) -> Self {
        match &mut self {
            Self::Quantity { offer, .. }
            | Self::Coverage { offer, .. }
            | Self::Amount { offer, .. } => offer.group_priority = priority,
            Self::Compound {
                offer, subupsells, ..
            } => {
                offer.group_priority = priority;
                *subupsells = std::mem::take(subupsells)
                    .into_iter()
                    .map(|u| u.with_group_priority(priority))
                    .collect();
            }
        }
        self
    }

    pub fn type_code(&self) -> &'static str {
        match self {
            Self::Quantity { .. } => "QuantityUpsell",
            Self::Coverage { .. } => "CoverageUpsell",
            Self::Amount { .. } => "AmountUpsell",
            Self::Compound { .. } => "CompoundUpsell",
        }
    }

    pub fn is_relevant_to_product(&self, product: &Product) -> bool {
        match self {
            Self::Quantity { range, .. }
            | Self::Coverage { range, .. }
            | Self::Amount { range, .. } => range.contains_product(product),
            Self::Compound { subupsells, .. } => {
                subupsells.iter().any(|u| u.is_relevant_to_product(product))
            }
        }
    }

    /// Call to action, e.g. "Buy 2 more products from Shirts"
    pub fn cta_text(&self) -> String {
        match self {
            Self::Quantity { range, delta, .. } | Self::Coverage { range, delta, .. } => {
                let noun = if *delta > Decimal::ONE { "products" } else { "product" };
                format!("Buy {} more {} from {}", delta.trunc(), noun, range.name)
            }
            Self::Amount {
                range,
                delta,
                currency,
                ..
            } => format!(
                "Spend {} more from {}",
                format_currency(*delta, currency),
                range.name
            ),
            Self::Compound {
                conjunction,
                subupsells,
                ..
            } => {
                let ctas: Vec<String> = subupsells.iter().map(OfferUpsell::cta_text).collect();
                human_readable_conjoin(*conjunction, &ctas, None)
            }
        }
    }

    pub fn reward_text(&self) -> String {
        format!(
            "to qualify for the {} special offer.",
            self.offer().offer_name
        )
    }

    pub fn summary(&self) -> String {
        format!("{} {}", self.cta_text(), self.reward_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsell_offer() -> UpsellOffer {
        UpsellOffer {
            offer_id: 7,
            offer_name: "Summer Shirts".to_string(),
            group_priority: None,
            offer_priority: 0,
        }
    }

    fn shirts() -> ProductRange {
        ProductRange::of_products(1, "Shirts", vec![1])
    }

    #[test]
    fn test_quantity_upsell_text() {
        let upsell = OfferUpsell::Quantity {
            offer: upsell_offer(),
            range: shirts(),
            delta: Decimal::from(2),
        };
        assert_eq!(upsell.cta_text(), "Buy 2 more products from Shirts");
        assert_eq!(
            upsell.summary(),
            "Buy 2 more products from Shirts to qualify for the Summer Shirts special offer."
        );

        let single = OfferUpsell::Coverage {
            offer: upsell_offer(),
            range: shirts(),
            delta: Decimal::ONE,
        };
        assert_eq!(single.cta_text(), "Buy 1 more product from Shirts");
    }

    #[test]
    fn test_amount_upsell_formats_currency() {
        let upsell = OfferUpsell::Amount {
            offer: upsell_offer(),
            range: shirts(),
            delta: Decimal::new(550, 2),
            currency: "USD".to_string(),
        };
        assert_eq!(upsell.cta_text(), "Spend $5.50 more from Shirts");
    }

    #[test]
    fn test_compound_upsell() {
        let socks = ProductRange::of_products(2, "Socks", vec![2]);
        let upsell = OfferUpsell::Compound {
            offer: upsell_offer(),
            conjunction: Conjunction::And,
            subupsells: vec![
                OfferUpsell::Quantity {
                    offer: upsell_offer(),
                    range: shirts(),
                    delta: Decimal::ONE,
                },
                OfferUpsell::Quantity {
                    offer: upsell_offer(),
                    range: socks,
                    delta: Decimal::from(3),
                },
            ],
        }
        .with_group_priority(Some(10));

        assert_eq!(
            upsell.cta_text(),
            "Buy 1 more product from Shirts and Buy 3 more products from Socks"
        );
        assert!(upsell.is_relevant_to_product(&Product::new(2, "Sock")));
        assert!(!upsell.is_relevant_to_product(&Product::new(3, "Hat")));
        assert_eq!(upsell.offer().group_priority, Some(10));
        assert_eq!(upsell.type_code(), "CompoundUpsell");
    }
}
