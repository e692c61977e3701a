use rust_decimal::Decimal;
use shared::error::AppResult;

use super::{ApplyContext, BenefitBase, BenefitBehavior, ConsumeMode, HUNDRED, percent_text};
use crate::basket::Basket;
use crate::offer::conditions::AffectedLine;
use crate::offer::results::ApplicationResult;
use crate::utils::money::round_down;

/// A percentage off every item in the range, cheapest items first
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageBenefit {
    pub base: BenefitBase,
}

impl BenefitBehavior for PercentageBenefit {
    fn name(&self) -> String {
        self.base.append_max_discount(format!(
            "{}% discount on {}, {}",
            percent_text(self.base.value_or_zero()),
            self.base.range_name(),
            self.base.max_affected_items_text()
        ))
    }

    fn clean(&self) -> AppResult<()> {
        self.base
            .require_range("Percentage benefits require a product range")?;
        let value = self.base.value_or_zero();
        if value <= Decimal::ZERO || value > HUNDRED {
            return Err(self
                .base
                .invalid("Percentage discount requires a value between 0 and 100"));
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
            .require_range("Percentage benefits require a product range")?;
        let percent = self.base.value_or_zero().min(HUNDRED);
        let mut available = self.base.max_discount_amount(max_total_discount);
        let max_affected_items = self.base.effective_max_affected_items();

        let mut discount = Decimal::ZERO;
        let mut affected_items = 0u32;
        let mut affected_lines = Vec::new();
        for (price, index) in basket.applicable_lines(range, false) {
            if affected_items >= max_affected_items {
                break;
            }
            if available.is_some_and(|a| a <= Decimal::ZERO) {
                break;
            }
            let line = &mut basket.lines[index];
            let quantity = line
                .quantity_without_discount()
                .min(max_affected_items - affected_items);
            if quantity == 0 {
                continue;
            }

            let mut line_discount = round_down(percent * price * Decimal::from(quantity) / HUNDRED);
            if let Some(available) = available.as_mut() {
                line_discount = line_discount.min(*available);
                *available -= line_discount;
            }
            if line_discount > Decimal::ZERO {
                line.discount(line_discount, quantity, ctx.offer, ctx.voucher);
                affected_lines.push(AffectedLine::new(index, line_discount, quantity));
                affected_items += quantity;
                discount += line_discount;
            }
        }

        if discount > Decimal::ZERO {
            consume.consume(ctx, basket, affected_lines);
        }
        Ok(ApplicationResult::basket_discount(discount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::benefits::test_helpers::*;

    fn make_benefit(value: i64) -> PercentageBenefit {
        PercentageBenefit {
            base: make_base(Some(value)),
        }
    }

    #[test]
    fn test_discounts_every_line() {
        let mut basket = make_basket();
        let offer = make_offer();
        let condition = make_condition(1);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let result = make_benefit(10)
            .apply(&mut basket, &ctx, None, ConsumeMode::Condition)
            .unwrap();
        assert_eq!(result.discount, Decimal::from(12));
        assert_eq!(basket.total_discount(), Decimal::from(12));
        assert!(basket.lines.iter().all(|l| l.quantity_without_discount() == 0));
    }

    #[test]
    fn test_max_affected_items_takes_cheapest_first() {
        let mut basket = make_basket();
        let offer = make_offer();
        let condition = make_condition(1);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let mut benefit = make_benefit(50);
        benefit.base.max_affected_items = Some(3);
        let result = benefit
            .apply(&mut basket, &ctx, None, ConsumeMode::Condition)
            .unwrap();
        // 2 x 10 and 1 x 20 at half price
        assert_eq!(result.discount, Decimal::from(20));
    }

    #[test]
    fn test_max_discount_caps_total() {
        let mut basket = make_basket();
        let offer = make_offer();
        let condition = make_condition(1);
        let ctx = ApplyContext {
            offer: &offer,
            condition: &condition,
            voucher: None,
        };
        let mut benefit = make_benefit(50);
        benefit.base.max_discount = Some(Decimal::from(15));
        let result = benefit
            .apply(&mut basket, &ctx, None, ConsumeMode::Condition)
            .unwrap();
        assert_eq!(result.discount, Decimal::from(15));

        let mut basket = make_basket();
        let result = benefit
            .apply(&mut basket, &ctx, Some(Decimal::from(4)), ConsumeMode::Condition)
            .unwrap();
        assert_eq!(result.discount, Decimal::from(4));
    }

    #[test]
    fn test_clean_rejects_out_of_range_values() {
        assert!(make_benefit(10).clean().is_ok());
        assert!(make_benefit(0).clean().is_err());
        assert!(make_benefit(101).clean().is_err());
        let mut no_range = make_benefit(10);
        no_range.base.range = None;
        assert!(no_range.clean().is_err());
    }

    #[test]
    fn test_name() {
        let mut benefit = make_benefit(15);
        assert_eq!(benefit.name(), "15% discount on Everything, no maximum");
        benefit.base.max_affected_items = Some(2);
        benefit.base.max_discount = Some(Decimal::from(5));
        assert_eq!(
            benefit.name(),
            "15% discount on Everything, maximum 2 item(s), maximum discount of $5.00"
        );
    }
}
