use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};
use shared::models::Conjunction;

use super::{ApplyContext, Benefit, BenefitBase, BenefitBehavior, ConsumeMode, UNLIMITED_DISCOUNT};
use crate::basket::Basket;
use crate::offer::results::ApplicationResult;
use crate::utils::money::human_readable_conjoin;

/// Applies every child benefit, sharing one discount budget
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundBenefit {
    pub base: BenefitBase,
    /// Resolved children, ordered by id
    pub children: Vec<Benefit>,
}

impl BenefitBehavior for CompoundBenefit {
    fn name(&self) -> String {
        let names: Vec<String> = self.children.iter().map(Benefit::name).collect();
        self.base.append_max_discount(human_readable_conjoin(
            Conjunction::And,
            &names,
            Some("Empty Benefit"),
        ))
    }

    fn clean(&self) -> AppResult<()> {
        if self.base.has_value() {
            return Err(self.base.invalid("Compound benefit should not have a value"));
        }
        if self.base.range.is_some() {
            return Err(self.base.invalid("Compound benefit should not have a range"));
        }
        if self.base.has_max_affected_items() {
            return Err(self
                .base
                .invalid("Compound benefit should not have a max affected items limit"));
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
        // Children always get an explicit budget, so their own caps never apply
        let mut available = self
            .base
            .max_discount_amount(max_total_discount)
            .unwrap_or(UNLIMITED_DISCOUNT);
        let mut affected_lines = Vec::new();
        let mut combined: Option<ApplicationResult> = None;

        for child in &self.children {
            let budget = Some(available.max(Decimal::ZERO));
            let result = child.apply(basket, ctx, budget, ConsumeMode::Collect(&mut affected_lines))?;
            match combined.as_mut() {
                None => combined = Some(result.clone()),
                Some(c) if c.kind == result.kind => c.discount += result.discount,
                Some(_) => {
                    return Err(AppError::incompatible_benefits()
                        .with_detail("benefit_id", self.base.id));
                }
            }
            available -= result.discount;
        }

        let Some(combined) = combined else {
            return Ok(ApplicationResult::zero());
        };
        if combined.discount > Decimal::ZERO {
            consume.consume(ctx, basket, affected_lines);
        }
        Ok(combined)
    }

    /// Children discount what is left of the charge, in order
    fn shipping_discount(&self, charge: Decimal) -> Decimal {
        self.children.iter().fold(Decimal::ZERO, |discount, child| {
            discount + child.shipping_discount(charge - discount)
        })
    }
}
