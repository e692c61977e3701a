//! Offer application results
//!
//! [`ApplicationResult`] is what one benefit application returns.
//! [`OfferApplications`] accumulates them per offer, remembering the order
//! in which offers first applied so offer and voucher discounts can be
//! interleaved for display.

use rust_decimal::Decimal;
use shared::models::{OfferApplication, ResultKind, VoucherRef};

use super::catalog::PreparedOffer;

/// Outcome of one benefit application
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationResult {
    pub kind: ResultKind,
    pub discount: Decimal,
    pub description: Option<String>,
    pub is_hidden: bool,
}

impl ApplicationResult {
    pub fn basket_discount(discount: Decimal) -> Self {
        Self {
            kind: ResultKind::Basket,
            discount,
            description: None,
            is_hidden: false,
        }
    }

    /// Basket discount of zero: the "nothing applied" result
    pub fn zero() -> Self {
        Self::basket_discount(Decimal::ZERO)
    }

    /// Shipping discounts are computed at checkout from the shipping charge
    pub fn shipping_discount() -> Self {
        Self {
            kind: ResultKind::Shipping,
            discount: Decimal::ZERO,
            description: None,
            is_hidden: false,
        }
    }

    /// Action to run once the order is placed
    ///
    /// None of the built-in benefits produce one. Embedding applications
    /// record them from an `ApplicatorHooks` implementation through
    /// `OfferApplications::add`.
    pub fn post_order_action(description: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::PostOrder,
            discount: Decimal::ZERO,
            description: Some(description.into()),
            is_hidden: false,
        }
    }

    /// Post-order action that is never shown to the customer
    pub fn hidden_post_order_action(description: impl Into<String>) -> Self {
        Self {
            is_hidden: true,
            ..Self::post_order_action(description)
        }
    }

    pub fn is_successful(&self) -> bool {
        match self.kind {
            ResultKind::Basket => self.discount > Decimal::ZERO,
            ResultKind::Shipping | ResultKind::PostOrder => true,
        }
    }

    /// Final results stop further applications of the same offer
    pub fn is_final(&self) -> bool {
        match self.kind {
            ResultKind::Basket => false,
            ResultKind::Shipping | ResultKind::PostOrder => true,
        }
    }

    pub fn affects_basket(&self) -> bool {
        self.kind == ResultKind::Basket
    }
}

/// Ordered collection of applications keyed by offer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferApplications {
    applications: Vec<OfferApplication>,
}

impl OfferApplications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful application of `offer`
    pub fn add(&mut self, offer: &PreparedOffer, result: &ApplicationResult) {
        let index = match self
            .applications
            .iter()
            .position(|a| a.offer_id == offer.offer.id)
        {
            Some(index) => index,
            None => {
                self.applications.push(OfferApplication {
                    offer_id: offer.offer.id,
                    offer_name: offer.offer.name.clone(),
                    offer_description: offer.offer.description.clone(),
                    voucher: offer.voucher.clone(),
                    freq: 0,
                    discount: Decimal::ZERO,
                    kind: result.kind,
                    descriptions: Vec::new(),
                    is_hidden: false,
                    index: self.applications.len(),
                });
                self.applications.len() - 1
            }
        };
        let application = &mut self.applications[index];
        application.discount += result.discount;
        application.freq += 1;
        application.is_hidden = result.is_hidden;
        if let Some(description) = &result.description {
            application.descriptions.push(description.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    pub fn get(&self, offer_id: i64) -> Option<&OfferApplication> {
        self.applications.iter().find(|a| a.offer_id == offer_id)
    }

    /// Every application, in first-application order
    pub fn iter(&self) -> impl Iterator<Item = &OfferApplication> {
        self.applications.iter()
    }

    pub fn total_discount(&self) -> Decimal {
        self.iter()
            .filter(|a| a.kind == ResultKind::Basket)
            .map(|a| a.discount)
            .sum()
    }

    /// Basket discounts from site and user offers
    pub fn offer_discounts(&self) -> Vec<&OfferApplication> {
        self.iter()
            .filter(|a| a.kind == ResultKind::Basket && a.voucher.is_none())
            .collect()
    }

    /// Basket discounts from vouchers
    pub fn voucher_discounts(&self) -> Vec<&OfferApplication> {
        self.iter()
            .filter(|a| a.kind == ResultKind::Basket && a.voucher.is_some())
            .collect()
    }

    pub fn shipping_discounts(&self) -> Vec<&OfferApplication> {
        self.iter().filter(|a| a.kind == ResultKind::Shipping).collect()
    }

    pub fn post_order_actions(&self) -> Vec<&OfferApplication> {
        self.iter().filter(|a| a.kind == ResultKind::PostOrder).collect()
    }

    /// Post-order actions that did not come from a voucher
    pub fn offer_post_order_actions(&self) -> Vec<&OfferApplication> {
        self.iter()
            .filter(|a| a.kind == ResultKind::PostOrder && a.voucher.is_none())
            .collect()
    }

    pub fn voucher_post_order_actions(&self) -> Vec<&OfferApplication> {
        self.iter()
            .filter(|a| a.kind == ResultKind::PostOrder && a.voucher.is_some())
            .collect()
    }

    /// Voucher discounts summed per voucher code, in first-application order
    pub fn grouped_voucher_discounts(&self) -> Vec<(VoucherRef, Decimal)> {
        let mut groups: Vec<(VoucherRef, Decimal)> = Vec::new();
        for application in self.voucher_discounts() {
            let Some(voucher) = &application.voucher else {
                continue;
            };
            match groups.iter_mut().find(|(v, _)| v.code == voucher.code) {
                Some((_, total)) => *total += application.discount,
                None => groups.push((voucher.clone(), application.discount)),
            }
        }
        groups
    }
}
