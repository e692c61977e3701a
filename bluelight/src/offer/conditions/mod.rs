//! Offer conditions
//!
//! A condition decides whether a basket qualifies for an offer and, once a
//! benefit applied, consumes the basket items that qualified it.
//!
//! # Dispatch
//!
//! Conditions use enum_dispatch: each variant implements
//! [`ConditionBehavior`] and [`Condition`] forwards to it.

mod compound;
mod count;
mod coverage;
mod value;

pub use compound::CompoundCondition;
pub use count::CountCondition;
pub use coverage::CoverageCondition;
pub use value::ValueCondition;

use enum_dispatch::enum_dispatch;
use rust_decimal::Decimal;
use shared::models::ConditionalOffer;

use crate::basket::Basket;
use crate::offer::upsells::OfferUpsell;

/// A basket line touched by a benefit or a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffectedLine {
    /// Index into `Basket::lines`
    pub line_index: usize,
    /// Discount the benefit applied to the line (zero for condition consumption)
    pub discount: Decimal,
    pub quantity: u32,
}

impl AffectedLine {
    pub fn new(line_index: usize, discount: Decimal, quantity: u32) -> Self {
        Self {
            line_index,
            discount,
            quantity,
        }
    }
}

#[enum_dispatch]
pub trait ConditionBehavior {
    /// Human-readable name, e.g. "Basket includes 3 item(s) from shirts"
    fn name(&self) -> String;

    fn is_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool;

    /// Some, but not enough, qualifying items are in the basket
    fn is_partially_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool;

    /// Consume the items needed to meet the condition
    ///
    /// Items already affected by the benefit count towards the condition.
    /// Returns `affected_lines` extended with the newly consumed lines.
    fn consume_items(
        &self,
        offer: &ConditionalOffer,
        basket: &mut Basket,
        affected_lines: Vec<AffectedLine>,
    ) -> Vec<AffectedLine>;

    fn get_upsell_details(&self, offer: &ConditionalOffer, basket: &Basket) -> Option<OfferUpsell>;
}

/// A resolved condition
#[enum_dispatch(ConditionBehavior)]
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Count(CountCondition),
    Coverage(CoverageCondition),
    Value(ValueCondition),
    Compound(CompoundCondition),
}

impl Condition {
    pub fn id(&self) -> i64 {
        match self {
            Self::Count(c) => c.id,
            Self::Coverage(c) => c.id,
            Self::Value(c) => c.id,
            Self::Compound(c) => c.id,
        }
    }

    /// Type tag this condition resolves from
    pub fn proxy_class(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::Coverage(_) => "coverage",
            Self::Value(c) if c.tax_inclusive => "tax_inclusive_value",
            Self::Value(_) => "value",
            Self::Compound(_) => "compound",
        }
    }
}

/// Ids of lines that count towards a condition, used to credit affected lines
pub(crate) fn line_ids(tuples: &[(Decimal, usize)]) -> Vec<usize> {
    tuples.iter().map(|(_, index)| *index).collect()
}
