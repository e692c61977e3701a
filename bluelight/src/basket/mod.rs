//! Basket
//!
//! Ordered basket lines plus the offer applications of the last
//! evaluation.

mod breakdown;
mod consumer;
mod line;

pub use breakdown::LinePriceBreakdownItem;
pub use consumer::LineOfferConsumer;
pub use line::{Line, LineDiscountDescription, PriceBreakdownStackEntry};

use rust_decimal::prelude::*;
use shared::models::{Product, ProductRange};

use crate::offer::results::OfferApplications;
use crate::offer::upsells::OfferUpsell;

#[derive(Debug, Clone)]
pub struct Basket {
    pub id: Option<i64>,
    pub currency: String,
    pub lines: Vec<Line>,
    /// Vouchers the customer added to this basket
    pub voucher_ids: Vec<i64>,
    pub shipping_charge: Option<Decimal>,
    pub offer_applications: OfferApplications,
    next_line_id: i64,
}

impl Basket {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            id: None,
            currency: currency.into(),
            lines: Vec::new(),
            voucher_ids: Vec::new(),
            shipping_charge: None,
            offer_applications: OfferApplications::new(),
            next_line_id: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn num_items(&self) -> u32 {
        self.lines.iter().map(Line::quantity).sum()
    }

    /// Add `quantity` units of a product, merging into an existing line at the same price
    ///
    /// Returns the index of the line holding the product.
    pub fn add_product(
        &mut self,
        product: Product,
        quantity: u32,
        unit_price_excl_tax: Option<Decimal>,
        unit_tax: Option<Decimal>,
    ) -> usize {
        if let Some(index) = self.lines.iter().position(|line| {
            line.product.id == product.id && line.unit_price_excl_tax == unit_price_excl_tax
        }) {
            let line = &mut self.lines[index];
            let new_quantity = line.quantity() + quantity;
            line.set_quantity(new_quantity);
            return index;
        }
        let line = Line::new(
            self.next_line_id,
            product,
            quantity,
            unit_price_excl_tax,
            unit_tax,
        );
        self.next_line_id += 1;
        self.lines.push(line);
        self.lines.len() - 1
    }

    pub fn add_voucher(&mut self, voucher_id: i64) {
        if !self.voucher_ids.contains(&voucher_id) {
            self.voucher_ids.push(voucher_id);
        }
    }

    /// Lines whose product is in `range`, discountable and priced, with their effective unit price
    ///
    /// Sorted cheapest first, or most expensive first when `most_expensive_first`.
    pub fn applicable_lines(
        &self,
        range: &ProductRange,
        most_expensive_first: bool,
    ) -> Vec<(Decimal, usize)> {
        let mut tuples: Vec<(Decimal, usize)> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.product.is_discountable && range.contains_product(&line.product))
            .map(|(index, line)| (line.unit_effective_price(), index))
            .filter(|(price, _)| !price.is_zero())
            .collect();
        if most_expensive_first {
            tuples.sort_by(|a, b| b.0.cmp(&a.0));
        } else {
            tuples.sort_by(|a, b| a.0.cmp(&b.0));
        }
        tuples
    }

    // ==================== Offer lifecycle ====================

    /// Drop every discount and application, ready for a fresh evaluation
    pub fn reset_offer_applications(&mut self) {
        for line in &mut self.lines {
            line.clear_discount();
        }
        self.offer_applications = OfferApplications::new();
    }

    pub fn clear_offer_upsells(&mut self) {
        for line in &mut self.lines {
            line.clear_offer_upsells();
        }
    }

    /// Attach an upsell to every line whose product it is relevant to
    pub fn add_offer_upsell(&mut self, upsell: &OfferUpsell) {
        for line in &mut self.lines {
            if upsell.is_relevant_to_product(&line.product) {
                line.add_offer_upsell(upsell.clone());
            }
        }
    }

    /// Distinct upsells across every line, in first-seen order
    pub fn get_offer_upsells(&self) -> Vec<OfferUpsell> {
        let mut upsells: Vec<OfferUpsell> = Vec::new();
        for upsell in self.lines.iter().flat_map(|line| line.offer_upsells()) {
            if !upsells.contains(upsell) {
                upsells.push(upsell.clone());
            }
        }
        upsells
    }

    // ==================== Totals ====================

    pub fn total_excl_tax_excl_discounts(&self) -> Decimal {
        self.lines
            .iter()
            .filter_map(Line::line_price_excl_tax)
            .sum()
    }

    pub fn total_excl_tax(&self) -> Decimal {
        self.lines
            .iter()
            .filter_map(Line::line_price_excl_tax_incl_discounts)
            .sum()
    }

    pub fn is_tax_known(&self) -> bool {
        self.lines.iter().all(Line::is_tax_known)
    }

    /// `None` while any line's tax is unknown
    pub fn total_tax(&self) -> Option<Decimal> {
        self.lines.iter().map(Line::line_tax).sum()
    }

    pub fn total_incl_tax(&self) -> Option<Decimal> {
        Some(self.total_excl_tax() + self.total_tax()?)
    }

    pub fn total_discount(&self) -> Decimal {
        self.lines.iter().map(Line::discount_value).sum()
    }
}
