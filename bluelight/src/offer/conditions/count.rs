//! Count condition: the basket holds at least N items from a range

use rust_decimal::Decimal;
use shared::models::{ConditionalOffer, ProductRange};

use super::{AffectedLine, ConditionBehavior, line_ids};
use crate::basket::{Basket, Line};
use crate::offer::upsells::{OfferUpsell, UpsellOffer};

#[derive(Debug, Clone, PartialEq)]
pub struct CountCondition {
    pub id: i64,
    pub range: ProductRange,
    pub value: u32,
}

impl CountCondition {
    fn can_apply(&self, line: &Line) -> bool {
        line.product.is_discountable && self.range.contains_product(&line.product)
    }

    fn num_matches(&self, offer: &ConditionalOffer, basket: &Basket) -> u32 {
        basket
            .lines
            .iter()
            .filter(|line| self.can_apply(line))
            .map(|line| line.quantity_without_offer_discount(offer))
            .sum()
    }
}

impl ConditionBehavior for CountCondition {
    fn name(&self) -> String {
        format!(
            "Basket includes {} item(s) from {}",
            self.value,
            self.range.name.to_lowercase()
        )
    }

    fn is_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool {
        self.num_matches(offer, basket) >= self.value
    }

    fn is_partially_satisfied(&self, offer: &ConditionalOffer, basket: &Basket) -> bool {
        let matches = self.num_matches(offer, basket);
        0 < matches && matches < self.value
    }

    fn consume_items(
        &self,
        _offer: &ConditionalOffer,
        basket: &mut Basket,
        mut affected_lines: Vec<AffectedLine>,
    ) -> Vec<AffectedLine> {
        let applicable = basket.applicable_lines(&self.range, true);
        let applicable_ids = line_ids(&applicable);

        let consumed: u32 = affected_lines
            .iter()
            .filter(|a| applicable_ids.contains(&a.line_index))
            .map(|a| a.quantity)
            .sum();
        let mut to_consume = self.value.saturating_sub(consumed);
        if to_consume == 0 {
            return affected_lines;
        }

        for (_, index) in applicable {
            let line = &mut basket.lines[index];
            let quantity = line.quantity_without_discount().min(to_consume);
            if quantity == 0 {
                continue;
            }
            line.consume(quantity, None);
            affected_lines.push(AffectedLine::new(index, Decimal::ZERO, quantity));
            to_consume -= quantity;
            if to_consume == 0 {
                break;
            }
        }
        affected_lines
    }

    fn get_upsell_details(&self, offer: &ConditionalOffer, basket: &Basket) -> Option<OfferUpsell> {
        let delta = self.value.saturating_sub(self.num_matches(offer, basket));
        (delta > 0).then(|| OfferUpsell::Quantity {
            offer: UpsellOffer::from_offer(offer),
            range: self.range.clone(),
            delta: Decimal::from(delta),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Product;

    fn make_condition(value: u32) -> CountCondition {
        CountCondition {
            id: 1,
            range: ProductRange::of_products(1, "Shirts", vec![1, 2]),
            value,
        }
    }

    fn make_basket() -> Basket {
        let mut basket = Basket::new("USD");
        basket.add_product(Product::new(1, "Cheap shirt"), 2, Some(Decimal::from(10)), None);
        basket.add_product(Product::new(2, "Dear shirt"), 1, Some(Decimal::from(30)), None);
        basket.add_product(Product::new(3, "Hat"), 5, Some(Decimal::from(8)), None);
        basket
    }

    #[test]
    fn test_satisfied_counts_range_items_only() {
        let offer = ConditionalOffer::new(1, "Three shirts", 1, 1);
        let basket = make_basket();
        assert!(make_condition(3).is_satisfied(&offer, &basket));
        assert!(!make_condition(4).is_satisfied(&offer, &basket));
        assert!(make_condition(4).is_partially_satisfied(&offer, &basket));
        assert!(!make_condition(3).is_partially_satisfied(&offer, &basket));
    }

    #[test]
    fn test_consume_takes_most_expensive_first() {
        let offer = ConditionalOffer::new(1, "Two shirts", 1, 1);
        let mut basket = make_basket();
        let affected = make_condition(2).consume_items(&offer, &mut basket, Vec::new());
        assert_eq!(
            affected,
            vec![
                AffectedLine::new(1, Decimal::ZERO, 1),
                AffectedLine::new(0, Decimal::ZERO, 1),
            ]
        );
        assert_eq!(basket.lines[0].quantity_without_discount(), 1);
        assert_eq!(basket.lines[1].quantity_without_discount(), 0);
    }

    #[test]
    fn test_consume_credits_affected_lines() {
        let offer = ConditionalOffer::new(1, "Two shirts", 1, 1);
        let mut basket = make_basket();
        let already = vec![AffectedLine::new(0, Decimal::ONE, 2)];
        let affected = make_condition(2).consume_items(&offer, &mut basket, already.clone());
        assert_eq!(affected, already);
        assert_eq!(basket.lines[1].quantity_without_discount(), 1);
    }

    #[test]
    fn test_upsell_reports_missing_items() {
        let offer = ConditionalOffer::new(1, "Five shirts", 1, 1);
        let upsell = make_condition(5)
            .get_upsell_details(&offer, &make_basket())
            .expect("two shirts missing");
        match upsell {
            OfferUpsell::Quantity { delta, .. } => assert_eq!(delta, Decimal::from(2)),
            other => panic!("unexpected upsell {:?}", other),
        }
        assert!(make_condition(3).get_upsell_details(&offer, &make_basket()).is_none());
    }

    #[test]
    fn test_name() {
        assert_eq!(make_condition(3).name(), "Basket includes 3 item(s) from shirts");
    }
}
