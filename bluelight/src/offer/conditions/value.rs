//! Value condition: the basket holds at least a given amount from a range

use rust_decimal::prelude::*;
use shared::models::{ConditionalOffer, ProductRange};

use super::{AffectedLine, ConditionBehavior, line_ids};
use crate::basket::{Basket, Line};
use crate::offer::upsells::{OfferUpsell, UpsellOffer};
use crate::utils::money::{DEFAULT_CURRENCY, format_currency};

#[derive(Debug, Clone, PartialEq)]
pub struct ValueCondition {
    pub id: i64,
    pub range: ProductRange,
    pub value: Decimal,
    /// Count line prices including tax
    pub tax_inclusive: bool,
}

impl ValueCondition {
    fn can_apply(&self, line: &Line) -> bool {
        line.product.is_discountable && self.range.contains_product(&line.product)
    }

    fn unit_price(&self, line: &Line) -> Decimal {
        let price = line.unit_effective_price();
        match line.unit_tax {
            Some(tax) if self.tax_inclusive => price + tax,
            _ => price,
        }
    }

    fn value_of_matches(&self, offer: &ConditionalOffer, basket: &Basket) -> Decimal {
        basket
            .lines
            .iter()
            .filter(|line| self.can_apply(line))
            .map(|line| {
                self.unit_price(line) * Decimal::from(line.quantity_without_offer_discount(offer))
            })
            .sum()
    }
}

impl ConditionBehavior for ValueCondition {
    fn name(&self) -> String {
        format!(
            "Basket includes {} ({}) from {}",
            format_currency(self.value, DEFAULT_CURRENCY),
            if self.tax_inclusive {
                "tax-inclusive"
            } else {
                "tax-exclusive"
            },
            self.range.name.to_lowercase()
        )
    }

    fn is_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool {
        self.value_of_matches(offer, basket) >= self.value
    }

    fn is_partially_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool {
        let matches = self.value_of_matches(offer, basket);
        Decimal::ZERO < matches && matches < self.value
    }

    fn consume_items(
        &self,
        _offer: &ConditionalOffer,
        basket: &mut Basket,
        mut affected_lines: Vec<AffectedLine>,
    ) -> Vec<AffectedLine> {
        let applicable = basket.applicable_lines(&self.range, true);
        let applicable_ids = line_ids(&applicable);

        let consumed: Decimal = affected_lines
            .iter()
            .filter(|a| applicable_ids.contains(&a.line_index))
            .map(|a| self.unit_price(&basket.lines[a.line_index]) * Decimal::from(a.quantity))
            .sum();
        let mut to_consume = (self.value - consumed).max(Decimal::ZERO);
        if to_consume.is_zero() {
            return affected_lines;
        }

        for (_, index) in applicable {
            let line = &mut basket.lines[index];
            let price = self.unit_price(line);
            if price <= Decimal::ZERO {
                continue;
            }
            let needed = (to_consume / price).ceil().to_u32().unwrap_or(u32::MAX);
            let quantity = line.quantity_without_discount().min(needed);
            if quantity == 0 {
                continue;
            }
            line.consume(quantity, None);
            affected_lines.push(AffectedLine::new(index, Decimal::ZERO, quantity));
            to_consume -= price * Decimal::from(quantity);
            if to_consume <= Decimal::ZERO {
                break;
            }
        }
        affected_lines
    }

    fn get_upsell_details(&self, offer: &ConditionalOffer, basket: &Basket) -> Option<OfferUpsell> {
        let delta = self.value - self.value_of_matches(offer, basket);
        (delta > Decimal::ZERO).then(|| OfferUpsell::Amount {
            offer: UpsellOffer::from_offer(offer),
            range: self.range.clone(),
            delta,
            currency: basket.currency.clone(),
        })
    }
}
