use rust_decimal::Decimal;
use shared::error::AppResult;

use super::{ApplyContext, BenefitBase, BenefitBehavior, ConsumeMode};
use crate::basket::Basket;
use crate::offer::conditions::AffectedLine;
use crate::offer::results::ApplicationResult;
use crate::utils::money::{DEFAULT_CURRENCY, format_currency, round_down};

/// A fixed amount off the items in the range, spread by line value
#[derive(Debug, Clone, PartialEq)]
pub struct AbsoluteBenefit {
    pub base: BenefitBase,
}

impl BenefitBehavior for AbsoluteBenefit {
    fn name(&self) -> String {
        self.base.append_max_discount(format!(
            "{} discount on {}, {}",
            format_currency(self.base.value_or_zero(), DEFAULT_CURRENCY),
            self.base.range_name().to_lowercase(),
            self.base.max_affected_items_text()
        ))
    }

    fn clean(&self) -> AppResult<()> {
        self.base
            .require_range("Fixed discount benefits require a product range")?;
        if !self.base.has_value() {
            return Err(self.base.invalid("Fixed discount benefits require a value"));
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
            .require_range("Fixed discount benefits require a product range")?;
        let max_affected_items = self.base.effective_max_affected_items();

        let mut num_affected_items = 0u32;
        let mut affected_items_total = Decimal::ZERO;
        let mut lines_to_discount = Vec::new();
        for (price, index) in basket.applicable_lines(range, false) {
            if num_affected_items >= max_affected_items {
                break;
            }
            let quantity = basket.lines[index]
                .quantity_without_discount()
                .min(max_affected_items - num_affected_items);
            if quantity == 0 {
                continue;
            }
            lines_to_discount.push((index, price, quantity));
            num_affected_items += quantity;
            affected_items_total += price * Decimal::from(quantity);
        }

        // Never discount more than the matching items are worth
        let mut discount = self.base.value_or_zero().min(affected_items_total);
        if let Some(available) = self.base.max_discount_amount(max_total_discount) {
            discount = discount.min(available);
        }
        if discount <= Decimal::ZERO {
            return Ok(ApplicationResult::zero());
        }

        let last = lines_to_discount.len() - 1;
        let mut applied = Decimal::ZERO;
        let mut affected_lines = Vec::new();
        for (i, &(index, price, quantity)) in lines_to_discount.iter().enumerate() {
            // The last line takes the remainder so rounding never loses a cent
            let line_discount = if i == last {
                discount - applied
            } else {
                round_down(price * Decimal::from(quantity) * discount / affected_items_total)
            };
            if line_discount > Decimal::ZERO {
                basket.lines[index].discount(line_discount, quantity, ctx.offer, ctx.voucher);
                affected_lines.push(AffectedLine::new(index, line_discount, quantity));
                applied += line_discount;
            }
        }

        consume.consume(ctx, basket, affected_lines);
        Ok(ApplicationResult::basket_discount(discount))
    }
}
