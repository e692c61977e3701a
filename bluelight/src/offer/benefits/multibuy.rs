use rust_decimal::Decimal;
use shared::error::AppResult;

use super::{ApplyContext, BenefitBase, BenefitBehavior, ConsumeMode};
use crate::basket::Basket;
use crate::offer::conditions::AffectedLine;
use crate::offer::results::ApplicationResult;

/// Buy one get one: one unit of the second most expensive item is free
#[derive(Debug, Clone, PartialEq)]
pub struct MultibuyBenefit {
    pub base: BenefitBase,
}

impl BenefitBehavior for MultibuyBenefit {
    fn name(&self) -> String {
        self.base.append_max_discount(format!(
            "Second most expensive product from {} is free",
            self.base.range_name().to_lowercase()
        ))
    }

    fn clean(&self) -> AppResult<()> {
        self.base
            .require_range("Multibuy benefits require a product range")?;
        if self.base.has_value() {
            return Err(self.base.invalid("Multibuy benefits don't require a value"));
        }
        if self.base.has_max_affected_items() {
            return Err(self
                .base
                .invalid("Multibuy benefits don't require a 'max affected items' attribute"));
        }
        Ok(())
    }

    fn apply(
        &self,
        basket: &mut Basket,
        ctx: &ApplyContext<'_>,
        max_total_discount: Option<Decimal>,
        consume: ConsumeMode<'_>,
    ) -> AppResult<ApplicationResult> {
        let range = self
            .base
            .require_range("Multibuy benefits require a product range")?;
        let line_tuples = basket.applicable_lines(range, false);
        let Some(&cheapest) = line_tuples.first() else {
            return Ok(ApplicationResult::zero());
        };

        // Walk down from the most expensive item; the free unit is the one
        // after the first paid unit.
        let mut more_expensive_items = 0u32;
        let mut chosen = None;
        for &(price, index) in line_tuples.iter().rev() {
            more_expensive_items += basket.lines[index].quantity_without_discount();
            if more_expensive_items > 1 {
                chosen = Some((price, index));
                break;
            }
        }
        let (price, index) = chosen.unwrap_or(cheapest);

        if basket.lines[index].quantity_without_discount() == 0 {
            return Ok(ApplicationResult::zero());
        }

        let mut discount = price;
        if let Some(available) = self.base.max_discount_amount(max_total_discount) {
            discount = discount.min(available);
        }
        if discount > Decimal::ZERO {
            basket.lines[index].discount(discount, 1, ctx.offer, ctx.voucher);
            consume.consume(ctx, basket, vec![AffectedLine::new(index, discount, 1)]);
        }
        Ok(ApplicationResult::basket_discount(discount.max(Decimal::ZERO)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::benefits::test_helpers::*;
    use shared::models::Product;

    fn make_benefit() -> MultibuyBenefit {
        MultibuyBenefit {
            base: make_base(None),
        }
    }

    #[test]
    fn test_second_most_expensive_unit_is_free() {
        let mut basket = make_basket();
        let offer = make_offer();
        let condition = make_condition(2);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let result = make_benefit()
            .apply(&mut basket, &ctx, None, ConsumeMode::Condition)
            .unwrap();
        // Two units at 30: the second one is free
        assert_eq!(result.discount, Decimal::from(30));
        assert_eq!(basket.lines[2].quantity_without_discount(), 0);
    }

    #[test]
    fn test_single_unit_falls_back_to_cheapest() {
        let mut basket = Basket::new("USD");
        basket.add_product(Product::new(1, "Lamp"), 1, Some(Decimal::from(25)), None);
        let offer = make_offer();
        let condition = make_condition(1);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let result = make_benefit()
            .apply(&mut basket, &ctx, None, ConsumeMode::Condition)
            .unwrap();
        assert_eq!(result.discount, Decimal::from(25));
    }

    #[test]
    fn test_clean_rules() {
        assert!(make_benefit().clean().is_ok());
        let mut with_value = make_benefit();
        with_value.base.value = Some(Decimal::ONE);
        assert!(with_value.clean().is_err());
        let mut with_max = make_benefit();
        with_max.base.max_affected_items = Some(2);
        assert!(with_max.clean().is_err());
    }
}
