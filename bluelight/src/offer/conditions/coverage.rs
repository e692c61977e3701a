//! Coverage condition: the basket holds at least N distinct products from a range

use rust_decimal::Decimal;
use shared::models::{ConditionalOffer, ProductRange};

use super::{AffectedLine, ConditionBehavior, line_ids};
use crate::basket::{Basket, Line};
use crate::offer::upsells::{OfferUpsell, UpsellOffer};

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageCondition {
    pub id: i64,
    pub range: ProductRange,
    pub value: u32,
}

impl CoverageCondition {
    fn can_apply(&self, line: &Line) -> bool {
        line.product.is_discountable && self.range.contains_product(&line.product)
    }

    fn num_covered_products(&self, offer: &ConditionalOffer, basket: &Basket) -> u32 {
        let mut covered: Vec<i64> = Vec::new();
        for line in &basket.lines {
            if self.can_apply(line)
                && line.is_available_for_offer_discount(offer)
                && !covered.contains(&line.product.id)
            {
                covered.push(line.product.id);
            }
        }
        covered.len() as u32
    }
}

impl ConditionBehavior for CoverageCondition {
    fn name(&self) -> String {
        format!(
            "Basket includes {} distinct item(s) from {}",
            self.value,
            self.range.name.to_lowercase()
        )
    }

    fn is_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool {
        self.num_covered_products(offer, basket) >= self.value
    }

    fn is_partially_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool {
        let covered = self.num_covered_products(offer, basket);
        0 < covered && covered < self.value
    }

    fn consume_items(
        &self,
        offer: &ConditionalOffer,
        basket: &mut Basket,
        mut affected_lines: Vec<AffectedLine>,
    ) -> Vec<AffectedLine> {
        let applicable_ids = line_ids(&basket.applicable_lines(&self.range, true));

        let mut consumed_products: Vec<i64> = affected_lines
            .iter()
            .filter(|a| applicable_ids.contains(&a.line_index))
            .map(|a| basket.lines[a.line_index].product.id)
            .collect();
        let mut to_consume = (self.value as usize).saturating_sub(consumed_products.len());
        if to_consume == 0 {
            return affected_lines;
        }

        for index in 0..basket.lines.len() {
            let line = &mut basket.lines[index];
            if !self.can_apply(line)
                || consumed_products.contains(&line.product.id)
                || !line.is_available_for_offer_discount(offer)
            {
                continue;
            }
            // One unit per distinct product
            line.consume(1, None);
            affected_lines.push(AffectedLine::new(index, Decimal::ZERO, 1));
            consumed_products.push(line.product.id);
            to_consume -= 1;
            if to_consume == 0 {
                break;
            }
        }
        affected_lines
    }

    fn get_upsell_details(&self, offer: &ConditionalOffer, basket: &Basket) -> Option<OfferUpsell> {
        let delta = self
            .value
            .saturating_sub(self.num_covered_products(offer, basket));
        (delta > 0).then(|| OfferUpsell::Coverage {
            offer: UpsellOffer::from_offer(offer),
            range: self.range.clone(),
            delta: Decimal::from(delta),
        })
    }
}
