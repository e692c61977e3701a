//! Shipping benefits
//!
//! Applying one only consumes the condition items and flags the basket for
//! a shipping discount; the amount is computed from the shipping charge
//! with [`BenefitBehavior::shipping_discount`].

use rust_decimal::Decimal;
use shared::error::AppResult;

use super::{ApplyContext, BenefitBase, BenefitBehavior, ConsumeMode, HUNDRED, percent_text};
use crate::basket::Basket;
use crate::offer::conditions::ConditionBehavior;
use crate::offer::results::ApplicationResult;
use crate::utils::money::{DEFAULT_CURRENCY, format_currency};

fn clean_shipping(base: &BenefitBase) -> AppResult<()> {
    if base.range.is_some() {
        return Err(base.invalid(
            "No range should be selected as this benefit does not apply to products",
        ));
    }
    if base.has_max_affected_items() {
        return Err(base.invalid("Shipping discounts don't require a 'max affected items' attribute"));
    }
    Ok(())
}

/// Shipping results always consume through the condition
fn apply_shipping(basket: &mut Basket, ctx: &ApplyContext<'_>) -> ApplicationResult {
    ctx.condition.consume_items(ctx.offer, basket, Vec::new());
    ApplicationResult::shipping_discount()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingAbsoluteBenefit {
    pub base: BenefitBase,
}

impl BenefitBehavior for ShippingAbsoluteBenefit {
    fn name(&self) -> String {
        self.base.append_max_discount(format!(
            "{} off shipping cost",
            format_currency(self.base.value_or_zero(), DEFAULT_CURRENCY)
        ))
    }

    fn clean(&self) -> AppResult<()> {
        if !self.base.has_value() {
            return Err(self.base.invalid("A discount value is required"));
        }
        clean_shipping(&self.base)
    }

    fn apply(
        &self,
        basket: &mut Basket,
        ctx: &ApplyContext<'_>,
        _max_total_discount: Option<Decimal>,
        _consume: ConsumeMode<'_>,
    ) -> AppResult<ApplicationResult> {
        Ok(apply_shipping(basket, ctx))
    }

    fn shipping_discount(&self, charge: Decimal) -> Decimal {
        charge.min(self.base.value_or_zero())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingFixedPriceBenefit {
    pub base: BenefitBase,
}

impl BenefitBehavior for ShippingFixedPriceBenefit {
    fn name(&self) -> String {
        self.base.append_max_discount(format!(
            "Get shipping for {}",
            format_currency(self.base.value_or_zero(), DEFAULT_CURRENCY)
        ))
    }

    fn clean(&self) -> AppResult<()> {
        clean_shipping(&self.base)
    }

    fn apply(
        &self,
        basket: &mut Basket,
        ctx: &ApplyContext<'_>,
        _max_total_discount: Option<Decimal>,
        _consume: ConsumeMode<'_>,
    ) -> AppResult<ApplicationResult> {
        Ok(apply_shipping(basket, ctx))
    }

    fn shipping_discount(&self, charge: Decimal) -> Decimal {
        let value = self.base.value_or_zero();
        if charge < value {
            Decimal::ZERO
        } else {
            charge - value
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingPercentageBenefit {
    pub base: BenefitBase,
}

impl BenefitBehavior for ShippingPercentageBenefit {
    fn name(&self) -> String {
        self.base.append_max_discount(format!(
            "{}% off of shipping cost",
            percent_text(self.base.value_or_zero())
        ))
    }

    fn clean(&self) -> AppResult<()> {
        if self.base.value_or_zero() > HUNDRED {
            return Err(self
                .base
                .invalid("Percentage discount cannot be greater than 100"));
        }
        clean_shipping(&self.base)
    }

    fn apply(
        &self,
        basket: &mut Basket,
        ctx: &ApplyContext<'_>,
        _max_total_discount: Option<Decimal>,
        _consume: ConsumeMode<'_>,
    ) -> AppResult<ApplicationResult> {
        Ok(apply_shipping(basket, ctx))
    }

    fn shipping_discount(&self, charge: Decimal) -> Decimal {
        (charge * self.base.value_or_zero() / HUNDRED).round_dp(2)
    }
}
