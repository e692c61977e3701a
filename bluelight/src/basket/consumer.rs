//! Line Offer Consumer
//!
//! Tracks how many units of a basket line offers have used. Consumption is
//! namespaced per offer group: every group pass starts with a fresh
//! affected quantity so later groups can compound on items earlier groups
//! already discounted, while a global counter remembers the overall total.

use std::collections::HashMap;

use shared::models::ConditionalOffer;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineOfferConsumer {
    quantity: u32,
    /// Exclusive flag of every offer that consumed from this line
    offers: HashMap<i64, bool>,
    affected_quantity: u32,
    consumptions: HashMap<i64, u32>,
    /// Subset of the affected quantity that was actually discounted in the current group
    discounted_quantity: u32,
    global_affected_quantity: u32,
}

impl LineOfferConsumer {
    pub fn new(quantity: u32) -> Self {
        Self {
            quantity,
            ..Self::default()
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.affected_quantity = self.affected_quantity.min(quantity);
        self.global_affected_quantity = self.global_affected_quantity.min(quantity);
    }

    fn update_affected_quantity(&mut self, quantity: u32) {
        let available_in_group = self.quantity.saturating_sub(self.affected_quantity);
        let available_global = self.quantity.saturating_sub(self.global_affected_quantity);
        self.affected_quantity += available_in_group.min(quantity);
        self.global_affected_quantity += available_global.min(quantity);
    }

    /// Mark `quantity` units as consumed in the current offer group
    ///
    /// Without an offer the units are consumed for every offer, otherwise
    /// only for the given one.
    pub fn consume(&mut self, quantity: u32, offer: Option<&ConditionalOffer>) {
        self.update_affected_quantity(quantity);
        if let Some(offer) = offer {
            self.offers.insert(offer.id, offer.exclusive);
            let available = self.available(Some(offer));
            *self.consumptions.entry(offer.id).or_insert(0) += available.min(quantity);
        }
    }

    /// Units consumed in the current group, optionally only by `offer`
    pub fn consumed(&self, offer: Option<&ConditionalOffer>) -> u32 {
        match offer {
            None => self.affected_quantity,
            Some(offer) => self.consumptions.get(&offer.id).copied().unwrap_or(0),
        }
    }

    /// Units still available to `offer` (or to any offer when `None`)
    pub fn available(&self, offer: Option<&ConditionalOffer>) -> u32 {
        let offer = offer.filter(|o| !o.exclusive && !self.offers.values().any(|&excl| excl));
        self.quantity.saturating_sub(self.consumed(offer))
    }

    pub fn discount(&mut self, quantity: u32) {
        self.discounted_quantity += quantity;
    }

    pub fn discounted(&self) -> u32 {
        self.discounted_quantity
    }

    pub fn global_affected_quantity(&self) -> u32 {
        self.global_affected_quantity
    }

    pub fn begin_offer_group_application(&mut self) {
        self.affected_quantity = 0;
        self.discounted_quantity = 0;
    }

    pub fn end_offer_group_application(&mut self) {
        self.discounted_quantity = 0;
    }

    pub fn finalize_offer_group_applications(&mut self) {
        self.affected_quantity = self.quantity.min(self.global_affected_quantity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_offer(id: i64, exclusive: bool) -> ConditionalOffer {
        let mut offer = ConditionalOffer::new(id, format!("Offer {}", id), 1, 1);
        offer.exclusive = exclusive;
        offer
    }

    #[test]
    fn test_consume_clamps_to_quantity() {
        let mut consumer = LineOfferConsumer::new(3);
        consumer.consume(2, None);
        consumer.consume(5, None);
        assert_eq!(consumer.consumed(None), 3);
        assert_eq!(consumer.available(None), 0);
        assert_eq!(consumer.global_affected_quantity(), 3);
    }

    #[test]
    fn test_exclusive_offer_blocks_others() {
        let exclusive = make_offer(1, true);
        let other = make_offer(2, false);
        let mut consumer = LineOfferConsumer::new(4);
        consumer.consume(3, Some(&exclusive));
        assert_eq!(consumer.available(Some(&exclusive)), 1);
        // A non-exclusive offer still sees the exclusive consumption
        assert_eq!(consumer.available(Some(&other)), 1);
    }

    #[test]
    fn test_non_exclusive_offers_share_items() {
        let a = make_offer(1, false);
        let b = make_offer(2, false);
        let mut consumer = LineOfferConsumer::new(2);
        consumer.consume(2, Some(&a));
        assert_eq!(consumer.available(Some(&a)), 0);
        assert_eq!(consumer.available(Some(&b)), 2);
        assert_eq!(consumer.available(None), 0);
    }

    #[test]
    fn test_group_lifecycle() {
        let mut consumer = LineOfferConsumer::new(2);
        consumer.begin_offer_group_application();
        consumer.consume(1, None);
        consumer.discount(1);
        assert_eq!(consumer.discounted(), 1);
        consumer.end_offer_group_application();
        assert_eq!(consumer.discounted(), 0);

        // The next group sees the line afresh
        consumer.begin_offer_group_application();
        assert_eq!(consumer.available(None), 2);
        consumer.consume(2, None);
        consumer.end_offer_group_application();

        consumer.finalize_offer_group_applications();
        assert_eq!(consumer.consumed(None), 2);
        assert_eq!(consumer.global_affected_quantity(), 2);
    }
}
