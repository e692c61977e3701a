//! Basket Line
//!
//! A line tracks its accumulated offer discount, the per-group price stack
//! used for price breakdowns, discount descriptions and attached upsells.

use rust_decimal::prelude::*;
use serde::Serialize;
use shared::models::{ConditionalOffer, Product, VoucherRef};

use super::consumer::LineOfferConsumer;
use crate::offer::upsells::OfferUpsell;
use crate::utils::money::round_half_up;

/// Quantity discounted by one offer group and the per-unit amount it took off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdownStackEntry {
    pub quantity_with_discount: u32,
    pub discount_delta_unit: Decimal,
}

/// Why a discount was applied to a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiscountDescription {
    pub amount: Decimal,
    pub offer_name: String,
    pub offer_description: String,
    pub voucher_name: Option<String>,
    pub voucher_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub id: i64,
    pub product: Product,
    /// Unit price excluding tax, `None` when the product has no price
    pub unit_price_excl_tax: Option<Decimal>,
    /// Unit tax, `None` while tax is unknown
    pub unit_tax: Option<Decimal>,
    consumer: LineOfferConsumer,
    discount_value: Decimal,
    /// Discount at the start of the current offer group
    offer_group_starting_discount: Decimal,
    price_breakdown_stack: Vec<PriceBreakdownStackEntry>,
    discount_descriptions: Vec<LineDiscountDescription>,
    offer_upsells: Vec<OfferUpsell>,
}

impl Line {
    pub fn new(
        id: i64,
        product: Product,
        quantity: u32,
        unit_price_excl_tax: Option<Decimal>,
        unit_tax: Option<Decimal>,
    ) -> Self {
        Self {
            id,
            product,
            unit_price_excl_tax,
            unit_tax,
            consumer: LineOfferConsumer::new(quantity),
            discount_value: Decimal::ZERO,
            offer_group_starting_discount: Decimal::ZERO,
            price_breakdown_stack: Vec::new(),
            discount_descriptions: Vec::new(),
            offer_upsells: Vec::new(),
        }
    }

    pub fn quantity(&self) -> u32 {
        self.consumer.quantity()
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.consumer.set_quantity(quantity);
    }

    pub fn consumer(&self) -> &LineOfferConsumer {
        &self.consumer
    }

    pub fn is_tax_known(&self) -> bool {
        self.unit_tax.is_some()
    }

    // ==================== Quantities ====================

    /// Units affected by offers (the current group's count during application)
    pub fn quantity_with_discount(&self) -> u32 {
        self.consumer.consumed(None)
    }

    /// Units still available to every offer
    pub fn quantity_without_discount(&self) -> u32 {
        self.consumer.available(None)
    }

    pub fn quantity_with_offer_discount(&self, offer: &ConditionalOffer) -> u32 {
        self.consumer.consumed(Some(offer))
    }

    pub fn quantity_without_offer_discount(&self, offer: &ConditionalOffer) -> u32 {
        self.consumer.available(Some(offer))
    }

    pub fn is_available_for_offer_discount(&self, offer: &ConditionalOffer) -> bool {
        self.consumer.available(Some(offer)) > 0
    }

    pub fn has_discount(&self) -> bool {
        self.quantity() > self.quantity_without_discount()
    }

    // ==================== Prices ====================

    /// Unit price used by offer calculations
    ///
    /// Discounts of earlier offer groups are already taken off so that
    /// compounding groups never push a line below zero.
    pub fn unit_effective_price(&self) -> Decimal {
        let quantity = self.quantity();
        match self.unit_price_excl_tax {
            Some(price) if quantity > 0 => {
                price - self.offer_group_starting_discount / Decimal::from(quantity)
            }
            _ => Decimal::ZERO,
        }
    }

    pub fn discount_value(&self) -> Decimal {
        self.discount_value
    }

    pub fn line_price_excl_tax(&self) -> Option<Decimal> {
        self.unit_price_excl_tax
            .map(|price| price * Decimal::from(self.quantity()))
    }

    pub fn line_price_excl_tax_incl_discounts(&self) -> Option<Decimal> {
        self.line_price_excl_tax()
            .map(|price| (price - self.discount_value).max(Decimal::ZERO))
    }

    /// Tax of the discounted line
    ///
    /// The undiscounted tax is scaled by the share of the line price left
    /// after discounts.
    pub fn line_tax(&self) -> Option<Decimal> {
        let unit_tax = self.unit_tax?;
        let full = self.line_price_excl_tax()?;
        let full_tax = unit_tax * Decimal::from(self.quantity());
        if full.is_zero() {
            return Some(round_half_up(full_tax));
        }
        let discounted = self.line_price_excl_tax_incl_discounts()?;
        Some(round_half_up(full_tax * discounted / full))
    }

    pub fn line_price_incl_tax(&self) -> Option<Decimal> {
        let tax = self.unit_tax? * Decimal::from(self.quantity());
        Some(self.line_price_excl_tax()? + tax)
    }

    pub fn line_price_incl_tax_incl_discounts(&self) -> Option<Decimal> {
        let excl = self.line_price_excl_tax_incl_discounts()?;
        let tax = self.line_tax()?;
        Some(round_half_up(excl + tax).max(Decimal::ZERO))
    }

    // ==================== Offer application ====================

    /// Consume units without discounting them (condition consumption)
    pub fn consume(&mut self, quantity: u32, offer: Option<&ConditionalOffer>) {
        self.consumer.consume(quantity, offer);
    }

    /// Apply a tax-exclusive discount to `quantity` units of this line
    pub fn discount(
        &mut self,
        amount: Decimal,
        quantity: u32,
        offer: &ConditionalOffer,
        voucher: Option<&VoucherRef>,
    ) {
        self.discount_value += amount;
        self.consumer.consume(quantity, Some(offer));
        self.consumer.discount(quantity);
        self.discount_descriptions.push(LineDiscountDescription {
            amount,
            offer_name: offer.name.clone(),
            offer_description: offer.description.clone(),
            voucher_name: voucher.map(|v| v.name.clone()),
            voucher_code: voucher.map(|v| v.code.clone()),
        });
    }

    pub fn discount_descriptions(&self) -> &[LineDiscountDescription] {
        &self.discount_descriptions
    }

    pub fn price_breakdown_stack(&self) -> &[PriceBreakdownStackEntry] {
        &self.price_breakdown_stack
    }

    /// Remove every discount from this line
    pub fn clear_discount(&mut self) {
        self.consumer = LineOfferConsumer::new(self.quantity());
        self.discount_value = Decimal::ZERO;
        self.offer_group_starting_discount = Decimal::ZERO;
        self.price_breakdown_stack.clear();
        self.discount_descriptions.clear();
    }

    pub fn begin_offer_group_application(&mut self) {
        self.consumer.begin_offer_group_application();
        self.offer_group_starting_discount = self.discount_value;
    }

    /// Close the current group, recording what it took off per discounted unit
    ///
    /// Calling it again before the next group starts is a no-op.
    pub fn end_offer_group_application(&mut self) {
        let discounted = self.consumer.discounted();
        if discounted > 0 {
            let delta_line = self.discount_value - self.offer_group_starting_discount;
            self.price_breakdown_stack.push(PriceBreakdownStackEntry {
                quantity_with_discount: discounted,
                discount_delta_unit: delta_line / Decimal::from(discounted),
            });
            self.consumer.end_offer_group_application();
        }
    }

    pub fn finalize_offer_group_applications(&mut self) {
        self.consumer.finalize_offer_group_applications();
        self.offer_group_starting_discount = self.discount_value;
    }

    // ==================== Upsells ====================

    pub fn clear_offer_upsells(&mut self) {
        self.offer_upsells.clear();
    }

    pub fn add_offer_upsell(&mut self, upsell: OfferUpsell) {
        self.offer_upsells.push(upsell);
    }

    pub fn offer_upsells(&self) -> &[OfferUpsell] {
        &self.offer_upsells
    }
}
