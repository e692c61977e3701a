//! Offer benefits
//!
//! A benefit turns a satisfied condition into a discount: it picks basket
//! lines, discounts them and consumes the items that qualified the offer.
//!
//! # Consumption
//!
//! Benefits normally hand their affected lines to the offer's condition.
//! A compound benefit instead collects the lines of its children and
//! consumes them once, see [`ConsumeMode`].

mod absolute;
mod compound;
mod fixed_price;
mod multibuy;
mod percentage;
mod shipping;

pub use absolute::AbsoluteBenefit;
pub use compound::CompoundBenefit;
pub use fixed_price::{FixedPriceBenefit, FixedPricePerItemBenefit};
pub use multibuy::MultibuyBenefit;
pub use percentage::PercentageBenefit;
pub use shipping::{ShippingAbsoluteBenefit, ShippingFixedPriceBenefit, ShippingPercentageBenefit};

use enum_dispatch::enum_dispatch;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};
use shared::models::{ConditionalOffer, ProductRange, VoucherRef};

use crate::basket::Basket;
use crate::offer::conditions::{AffectedLine, Condition, ConditionBehavior};
use crate::offer::results::ApplicationResult;
use crate::utils::money::{DEFAULT_CURRENCY, format_currency};

/// Item limit used when a benefit sets no `max_affected_items`
pub const DEFAULT_MAX_AFFECTED_ITEMS: u32 = 10000;

/// Budget that overrides any benefit's own `max_discount`
pub const UNLIMITED_DISCOUNT: Decimal = Decimal::MAX;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The offer a benefit is applied for
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    pub offer: &'a ConditionalOffer,
    pub condition: &'a Condition,
    /// Voucher the offer was reached through, recorded on line discounts
    pub voucher: Option<&'a VoucherRef>,
}

/// Where a benefit sends the lines it affected
pub enum ConsumeMode<'a> {
    /// Let the offer's condition consume them
    Condition,
    /// Collect them for the caller (compound benefits)
    Collect(&'a mut Vec<AffectedLine>),
}

impl ConsumeMode<'_> {
    fn consume(self, ctx: &ApplyContext<'_>, basket: &mut Basket, affected_lines: Vec<AffectedLine>) {
        match self {
            Self::Condition => {
                ctx.condition.consume_items(ctx.offer, basket, affected_lines);
            }
            Self::Collect(sink) => sink.extend(affected_lines),
        }
    }
}

/// Fields shared by every benefit type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BenefitBase {
    pub id: i64,
    pub range: Option<ProductRange>,
    pub value: Option<Decimal>,
    pub max_affected_items: Option<u32>,
    pub max_discount: Option<Decimal>,
}

impl BenefitBase {
    pub fn effective_max_affected_items(&self) -> u32 {
        self.max_affected_items
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_AFFECTED_ITEMS)
    }

    /// Discount budget: the caller's limit wins over the benefit's own, `None` is unlimited
    pub fn max_discount_amount(&self, max_total_discount: Option<Decimal>) -> Option<Decimal> {
        max_total_discount.or(self.max_discount)
    }

    pub fn value_or_zero(&self) -> Decimal {
        self.value.unwrap_or(Decimal::ZERO)
    }

    fn has_value(&self) -> bool {
        self.value.is_some_and(|v| !v.is_zero())
    }

    fn has_max_affected_items(&self) -> bool {
        self.max_affected_items.is_some_and(|n| n > 0)
    }

    fn require_range(&self, message: &str) -> AppResult<&ProductRange> {
        self.range
            .as_ref()
            .ok_or_else(|| AppError::benefit_invalid(message).with_detail("benefit_id", self.id))
    }

    fn invalid(&self, message: &str) -> AppError {
        AppError::benefit_invalid(message).with_detail("benefit_id", self.id)
    }

    fn range_name(&self) -> String {
        self.range
            .as_ref()
            .map(|r| r.name.clone())
            .unwrap_or_else(|| "product range".to_string())
    }

    fn max_affected_items_text(&self) -> String {
        match self.max_affected_items {
            Some(n) if n > 0 => format!("maximum {} item(s)", n),
            _ => "no maximum".to_string(),
        }
    }

    fn append_max_discount(&self, text: String) -> String {
        match self.max_discount {
            Some(max) if !max.is_zero() => format!(
                "{}, maximum discount of {}",
                text,
                format_currency(max, DEFAULT_CURRENCY)
            ),
            _ => text,
        }
    }
}

#[enum_dispatch]
pub trait BenefitBehavior {
    fn name(&self) -> String;

    /// Check the benefit's configuration
    fn clean(&self) -> AppResult<()>;

    /// Discount the basket once
    ///
    /// `max_total_discount` caps the discount of this application on top of
    /// the benefit's own `max_discount`.
    fn apply(
        &self,
        basket: &mut Basket,
        ctx: &ApplyContext<'_>,
        max_total_discount: Option<Decimal>,
        consume: ConsumeMode<'_>,
    ) -> AppResult<ApplicationResult>;

    /// Discount on a shipping charge, zero for basket benefits
    fn shipping_discount(&self, _charge: Decimal) -> Decimal {
        Decimal::ZERO
    }
}

/// A resolved benefit
#[enum_dispatch(BenefitBehavior)]
#[derive(Debug, Clone, PartialEq)]
pub enum Benefit {
    Percentage(PercentageBenefit),
    Absolute(AbsoluteBenefit),
    FixedPrice(FixedPriceBenefit),
    FixedPricePerItem(FixedPricePerItemBenefit),
    Multibuy(MultibuyBenefit),
    ShippingAbsolute(ShippingAbsoluteBenefit),
    ShippingFixedPrice(ShippingFixedPriceBenefit),
    ShippingPercentage(ShippingPercentageBenefit),
    Compound(CompoundBenefit),
}

impl Benefit {
    pub fn base(&self) -> &BenefitBase {
        match self {
            Self::Percentage(b) => &b.base,
            Self::Absolute(b) => &b.base,
            Self::FixedPrice(b) => &b.base,
            Self::FixedPricePerItem(b) => &b.base,
            Self::Multibuy(b) => &b.base,
            Self::ShippingAbsolute(b) => &b.base,
            Self::ShippingFixedPrice(b) => &b.base,
            Self::ShippingPercentage(b) => &b.base,
            Self::Compound(b) => &b.base,
        }
    }

    pub fn id(&self) -> i64 {
        self.base().id
    }

    /// Type tag this benefit resolves from
    pub fn proxy_class(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::Absolute(_) => "absolute",
            Self::FixedPrice(_) => "fixed_price",
            Self::FixedPricePerItem(_) => "fixed_price_per_item",
            Self::Multibuy(_) => "multibuy",
            Self::ShippingAbsolute(_) => "shipping_absolute",
            Self::ShippingFixedPrice(_) => "shipping_fixed_price",
            Self::ShippingPercentage(_) => "shipping_percentage",
            Self::Compound(_) => "compound",
        }
    }

    pub fn is_shipping(&self) -> bool {
        matches!(
            self,
            Self::ShippingAbsolute(_) | Self::ShippingFixedPrice(_) | Self::ShippingPercentage(_)
        )
    }
}

/// Format a percentage value without trailing zeros, e.g. `12.5`
fn percent_text(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use crate::offer::conditions::CountCondition;
    use shared::models::Product;

    pub fn make_range() -> ProductRange {
        ProductRange::all_products(1, "Everything")
    }

    pub fn make_base(value: Option<i64>) -> BenefitBase {
        BenefitBase {
            id: 1,
            range: Some(make_range()),
            value: value.map(Decimal::from),
            max_affected_items: None,
            max_discount: None,
        }
    }

    pub fn make_condition(value: u32) -> Condition {
        Condition::Count(CountCondition {
            id: 1,
            range: make_range(),
            value,
        })
    }

    /// Lines priced 10, 20 and 30, two units each
    pub fn make_basket() -> Basket {
        let mut basket = Basket::new("USD");
        for (id, price) in [(1, 10), (2, 20), (3, 30)] {
            basket.add_product(
                Product::new(id, format!("Product {}", id)),
                2,
                Some(Decimal::from(price)),
                None,
            );
        }
        basket
    }

    pub fn make_offer() -> ConditionalOffer {
        ConditionalOffer::new(1, "Test offer", 1, 1)
    }
}
