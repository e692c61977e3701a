//! Compound condition: children joined with AND / OR

use shared::models::{Conjunction, ConditionalOffer};

use super::{AffectedLine, Condition, ConditionBehavior};
use crate::basket::Basket;
use crate::offer::upsells::{OfferUpsell, UpsellOffer};
use crate::utils::money::human_readable_conjoin;

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundCondition {
    pub id: i64,
    pub conjunction: Conjunction,
    /// Resolved children, ordered by id
    pub children: Vec<Condition>,
}

impl CompoundCondition {
    fn reduce(&self, conjunction: Conjunction, f: impl Fn(&Condition) -> bool) -> bool {
        match conjunction {
            Conjunction::And => self.children.iter().all(f),
            Conjunction::Or => self.children.iter().any(f),
        }
    }
}

impl ConditionBehavior for CompoundCondition {
    fn name(&self) -> String {
        let names: Vec<String> = self.children.iter().map(Condition::name).collect();
        human_readable_conjoin(self.conjunction, &names, Some("Empty Condition"))
    }

    fn is_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool {
        self.reduce(self.conjunction, |c| c.is_satisfied(offer, basket))
    }

    /// Partial satisfaction of any child counts, whatever the conjunction
    fn is_partially_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool {
        self.reduce(Conjunction::Or, |c| c.is_partially_satisfied(offer, basket))
    }

    fn consume_items(
        &self,
        offer: &ConditionalOffer,
        basket: &mut Basket,
        affected_lines: Vec<AffectedLine>,
    ) -> Vec<AffectedLine> {
        self.children
            .iter()
            .fold(affected_lines, |memo, child| {
                child.consume_items(offer, basket, memo)
            })
    }

    fn get_upsell_details(&self, offer: &ConditionalOffer, basket: &Basket) -> Option<OfferUpsell> {
        let subupsells: Vec<OfferUpsell> = self
            .children
            .iter()
            .filter(|c| !c.is_satisfied(offer, basket) && c.is_partially_satisfied(offer, basket))
            .filter_map(|c| c.get_upsell_details(offer, basket))
            .collect();
        if subupsells.is_empty() {
            return None;
        }
        Some(OfferUpsell::Compound {
            offer: UpsellOffer::from_offer(offer),
            conjunction: self.conjunction,
            subupsells,
        })
    }
}
