//! Fixed price benefits
//!
//! Both sell the most expensive items of the benefit range at a set price.
//! Neither consumes condition items.

use rust_decimal::Decimal;
use shared::error::AppResult;

use super::{ApplyContext, BenefitBase, BenefitBehavior, ConsumeMode};
use crate::basket::Basket;
use crate::offer::results::ApplicationResult;
use crate::utils::money::{DEFAULT_CURRENCY, format_currency, round_down};

/// The covered items are sold for `value` in total
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPriceBenefit {
    pub base: BenefitBase,
}

impl BenefitBehavior for FixedPriceBenefit {
    fn name(&self) -> String {
        self.base.append_max_discount(format!(
            "The products in the range are sold for {}, {}",
            format_currency(self.base.value_or_zero(), DEFAULT_CURRENCY),
            self.base.max_affected_items_text()
        ))
    }

    fn clean(&self) -> AppResult<()> {
        self.base
            .require_range("Fixed price benefits require a product range.")
            .map(|_| ())
    }

    fn apply(
        &self,
        basket: &mut Basket,
        ctx: &ApplyContext<'_>,
        max_total_discount: Option<Decimal>,
        _consume: ConsumeMode<'_>,
    ) -> AppResult<ApplicationResult> {
        let range = self
            .base
            .require_range("Fixed price benefits require a product range.")?;
        let num_permitted = self.base.effective_max_affected_items();

        let mut num_affected = 0u32;
        let mut value_affected = Decimal::ZERO;
        let mut covered_lines = Vec::new();
        for (price, index) in basket.applicable_lines(range, true) {
            let quantity = basket.lines[index]
                .quantity_without_discount()
                .min(num_permitted - num_affected);
            if quantity > 0 {
                num_affected += quantity;
                value_affected += price * Decimal::from(quantity);
                covered_lines.push((index, price, quantity));
            }
            if num_affected >= num_permitted {
                break;
            }
        }

        let mut discount = (value_affected - self.base.value_or_zero()).max(Decimal::ZERO);
        if let Some(available) = self.base.max_discount_amount(max_total_discount) {
            discount = discount.min(available);
        }
        if discount <= Decimal::ZERO {
            return Ok(ApplicationResult::zero());
        }

        let last = covered_lines.len() - 1;
        let mut applied = Decimal::ZERO;
        for (i, &(index, price, quantity)) in covered_lines.iter().enumerate() {
            let line_discount = if i == last {
                discount - applied
            } else {
                round_down(discount * price * Decimal::from(quantity) / value_affected)
            };
            if line_discount > Decimal::ZERO {
                basket.lines[index].discount(line_discount, quantity, ctx.offer, ctx.voucher);
                applied += line_discount;
            }
        }
        Ok(ApplicationResult::basket_discount(discount))
    }
}

/// Every covered item priced above `value` is sold for `value`
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPricePerItemBenefit {
    pub base: BenefitBase,
}

impl BenefitBehavior for FixedPricePerItemBenefit {
    fn name(&self) -> String {
        self.base.append_max_discount(format!(
            "The products in the range are sold for {} each; {}",
            format_currency(self.base.value_or_zero(), DEFAULT_CURRENCY),
            self.base.max_affected_items_text()
        ))
    }

    fn clean(&self) -> AppResult<()> {
        self.base
            .require_range("Fixed price per item benefits require a product range.")
            .map(|_| ())
    }

    fn apply(
        &self,
        basket: &mut Basket,
        ctx: &ApplyContext<'_>,
        max_total_discount: Option<Decimal>,
        _consume: ConsumeMode<'_>,
    ) -> AppResult<ApplicationResult> {
        let range = self
            .base
            .require_range("Fixed price per item benefits require a product range.")?;
        let value = self.base.value_or_zero();
        let num_permitted = self.base.effective_max_affected_items();

        let mut num_affected = 0u32;
        let mut covered_lines = Vec::new();
        for (price, index) in basket.applicable_lines(range, true) {
            if price <= value {
                continue;
            }
            let quantity = basket.lines[index]
                .quantity_without_discount()
                .min(num_permitted - num_affected);
            if quantity == 0 {
                continue;
            }
            num_affected += quantity;
            covered_lines.push((index, price, quantity));
            if num_affected >= num_permitted {
                break;
            }
        }
        if covered_lines.is_empty() {
            return Ok(ApplicationResult::zero());
        }

        let available = self.base.max_discount_amount(max_total_discount);
        let mut applied = Decimal::ZERO;
        for (index, price, quantity) in covered_lines {
            let mut line_discount = round_down((price - value) * Decimal::from(quantity));
            if let Some(available) = available {
                line_discount = line_discount.min(available - applied).max(Decimal::ZERO);
            }
            if line_discount > Decimal::ZERO {
                basket.lines[index].discount(line_discount, quantity, ctx.offer, ctx.voucher);
                applied += line_discount;
            }
        }
        Ok(ApplicationResult::basket_discount(applied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::benefits::test_helpers::*;

    #[test]
    fn test_fixed_price_sells_most_expensive_items() {
        let mut basket = make_basket();
        let offer = make_offer();
        let condition = make_condition(1);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let mut base = make_base(Some(40));
        base.max_affected_items = Some(3);
        let result = FixedPriceBenefit { base }
            .apply(&mut basket, &ctx, None, ConsumeMode::Condition)
            .unwrap();
        // 2 x 30 + 1 x 20 sold for 40
        assert_eq!(result.discount, Decimal::from(40));
        assert_eq!(basket.lines[2].discount_value(), Decimal::from(30));
        assert_eq!(basket.lines[1].discount_value(), Decimal::from(10));
        assert_eq!(basket.lines[0].discount_value(), Decimal::ZERO);
        // Condition items stay available
        assert_eq!(basket.lines[0].quantity_without_discount(), 2);
    }

    #[test]
    fn test_fixed_price_above_value_gives_nothing() {
        let mut basket = make_basket();
        let offer = make_offer();
        let condition = make_condition(1);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let result = FixedPriceBenefit {
            base: make_base(Some(500)),
        }
        .apply(&mut basket, &ctx, None, ConsumeMode::Condition)
        .unwrap();
        assert!(!result.is_successful());
    }

    #[test]
    fn test_fixed_price_per_item_skips_cheap_items() {
        let mut basket = make_basket();
        let offer = make_offer();
        let condition = make_condition(1);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let result = FixedPricePerItemBenefit {
            base: make_base(Some(15)),
        }
        .apply(&mut basket, &ctx, None, ConsumeMode::Condition)
        .unwrap();
        // (30 - 15) x 2 + (20 - 15) x 2
        assert_eq!(result.discount, Decimal::from(40));
        assert_eq!(basket.lines[0].discount_value(), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_price_per_item_respects_budget() {
        let mut basket = make_basket();
        let offer = make_offer();
        let condition = make_condition(1);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let result = FixedPricePerItemBenefit {
            base: make_base(Some(15)),
        }
        .apply(&mut basket, &ctx, Some(Decimal::from(32)), ConsumeMode::Condition)
        .unwrap();
        assert_eq!(result.discount, Decimal::from(32));
        assert_eq!(basket.lines[1].discount_value(), Decimal::from(2));
    }
}
