//! Line Price Breakdown
//!
//! Splits a discounted line into groups of units sharing the same price.

use rust_decimal::prelude::*;
use serde::Serialize;
use shared::error::{AppError, AppResult};

use super::line::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinePriceBreakdownItem {
    pub unit_price_incl_tax: Decimal,
    pub unit_price_excl_tax: Decimal,
    pub quantity: u32,
}

impl Line {
    /// Breakdown of the line's unit prices after discounts
    ///
    /// Fails while the line's tax is unknown.
    pub fn get_price_breakdown(&mut self) -> AppResult<Vec<LinePriceBreakdownItem>> {
        let (Some(unit_price), Some(line_tax)) = (self.unit_price_excl_tax, self.line_tax()) else {
            return Err(AppError::tax_unknown(self.id));
        };
        let quantity = self.quantity();

        // Flush a group that was applied but never closed
        self.end_offer_group_application();

        // Runs of units sharing a price, in unit order
        let mut runs: Vec<(Decimal, u32)> = vec![(unit_price, quantity)];
        for entry in self.price_breakdown_stack() {
            let delta = entry.discount_delta_unit;
            let mut remaining = entry.quantity_with_discount;
            let mut iterations = 0;
            while remaining > 0 && iterations <= quantity {
                let before = remaining;
                runs = discount_runs(runs, delta, &mut remaining);
                if remaining == before {
                    break;
                }
                iterations += 1;
            }
        }

        runs.sort_by_key(|&(price, _)| price);
        let mut price_qtys: Vec<(Decimal, u32)> = Vec::new();
        for (price, count) in runs {
            match price_qtys.last_mut() {
                Some((last, qty)) if *last == price => *qty += count,
                _ => price_qtys.push((price, count)),
            }
        }

        let line_price = self
            .line_price_excl_tax_incl_discounts()
            .unwrap_or(Decimal::ZERO);
        if line_price <= Decimal::ZERO {
            return Ok(vec![LinePriceBreakdownItem {
                unit_price_incl_tax: line_tax,
                unit_price_excl_tax: Decimal::ZERO,
                quantity,
            }]);
        }

        Ok(price_qtys
            .into_iter()
            .map(|(unit_price_excl_tax, quantity)| {
                let unit_tax = unit_price_excl_tax / line_price * line_tax;
                let unit_price_incl_tax = (unit_price_excl_tax + unit_tax).round_dp_with_strategy(
                    unit_price_excl_tax.scale(),
                    RoundingStrategy::MidpointNearestEven,
                );
                LinePriceBreakdownItem {
                    unit_price_incl_tax,
                    unit_price_excl_tax,
                    quantity,
                }
            })
            .collect())
    }
}

/// One pass over the units: each unit priced at least `delta` loses `delta`
/// until `remaining` units have been discounted
fn discount_runs(runs: Vec<(Decimal, u32)>, delta: Decimal, remaining: &mut u32) -> Vec<(Decimal, u32)> {
    let mut next = Vec::with_capacity(runs.len() + 1);
    for (price, count) in runs {
        if *remaining == 0 || price < delta || count == 0 {
            next.push((price, count));
            continue;
        }
        let taken = count.min(*remaining);
        *remaining -= taken;
        next.push((price - delta, taken));
        if taken < count {
            next.push((price, count - taken));
        }
    }
    next
}
