//! Offer catalog
//!
//! In-memory store of ranges, products, condition and benefit rows, offers
//! and offer groups. Offers are prepared for application by resolving
//! their condition and benefit proxies.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    BenefitRow, ConditionRow, ConditionalOffer, OfferGroup, OfferType, Product, ProductRange,
    VoucherRef,
};

use super::benefits::{ApplyContext, Benefit, BenefitBehavior, ConsumeMode};
use super::conditions::{Condition, ConditionBehavior};
use super::groups::OfferGroupRegistry;
use super::proxy::{BenefitProxy, CatalogLookup, ConditionProxy};
use super::results::ApplicationResult;
use super::upsells::OfferUpsell;
use crate::basket::Basket;
use crate::pricing::PricingNamespace;

// =============================================================================
// PreparedOffer
// =============================================================================

/// An offer with its condition and benefit resolved, ready to apply
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedOffer {
    pub offer: ConditionalOffer,
    pub condition: Condition,
    pub benefit: Benefit,
    pub group: Option<OfferGroup>,
    /// Voucher the offer was reached through
    pub voucher: Option<VoucherRef>,
}

impl PreparedOffer {
    pub fn group_priority(&self) -> Option<i32> {
        self.group.as_ref().map(|g| g.priority)
    }

    /// Apply the benefit once
    ///
    /// Returns a zero discount when the condition isn't met. Benefit errors
    /// are logged and also turned into a zero discount.
    pub fn apply_benefit(&self, basket: &mut Basket) -> ApplicationResult {
        if !self.is_condition_satisfied(basket) {
            return ApplicationResult::zero();
        }
        let ctx = ApplyContext {
            offer: &self.offer,
            condition: &self.condition,
            voucher: self.voucher.as_ref(),
        };
        match self.benefit.apply(basket, &ctx, None, ConsumeMode::Condition) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    offer_id = self.offer.id,
                    benefit_id = self.benefit.id(),
                    error = %e,
                    "Benefit application failed"
                );
                ApplicationResult::zero()
            }
        }
    }

    pub fn is_condition_satisfied(&self, basket: &Basket) -> bool {
        self.condition.is_satisfied(&self.offer, basket)
    }

    pub fn is_condition_partially_satisfied(&self, basket: &Basket) -> bool {
        self.condition.is_partially_satisfied(&self.offer, basket)
    }

    pub fn get_upsell_details(&self, basket: &Basket) -> Option<OfferUpsell> {
        self.condition
            .get_upsell_details(&self.offer, basket)
            .map(|u| u.with_group_priority(self.group_priority()))
    }

    pub fn shipping_discount(&self, charge: Decimal) -> Decimal {
        self.benefit.shipping_discount(charge)
    }
}

// =============================================================================
// OfferCatalog
// =============================================================================

/// Every write bumps the pricing namespace, which invalidates cosmetic
/// prices computed from the previous catalog state.
#[derive(Clone)]
pub struct OfferCatalog {
    ranges: Arc<RwLock<HashMap<i64, ProductRange>>>,
    products: Arc<RwLock<HashMap<i64, Product>>>,
    conditions: Arc<RwLock<HashMap<i64, ConditionRow>>>,
    benefits: Arc<RwLock<HashMap<i64, BenefitRow>>>,
    offers: Arc<RwLock<HashMap<i64, ConditionalOffer>>>,
    groups: OfferGroupRegistry,
    pricing_namespace: PricingNamespace,
}

impl std::fmt::Debug for OfferCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfferCatalog")
            .field("ranges_count", &self.ranges.read().len())
            .field("products_count", &self.products.read().len())
            .field("offers_count", &self.offers.read().len())
            .field("groups", &self.groups)
            .field("pricing_version", &self.pricing_namespace.current())
            .finish()
    }
}

impl Default for OfferCatalog {
    fn default() -> Self {
        let pricing_namespace = PricingNamespace::default();
        Self {
            ranges: Arc::default(),
            products: Arc::default(),
            conditions: Arc::default(),
            benefits: Arc::default(),
            offers: Arc::default(),
            groups: OfferGroupRegistry::with_pricing_namespace(pricing_namespace.clone()),
            pricing_namespace,
        }
    }
}

impl OfferCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &OfferGroupRegistry {
        &self.groups
    }

    /// Version counter bumped by every catalog and group write
    pub fn pricing_namespace(&self) -> &PricingNamespace {
        &self.pricing_namespace
    }

    // ==================== Writes ====================

    pub fn insert_range(&self, range: ProductRange) {
        self.ranges.write().insert(range.id, range);
        self.pricing_namespace.bump();
    }

    pub fn insert_product(&self, product: Product) {
        self.products.write().insert(product.id, product);
        self.pricing_namespace.bump();
    }

    pub fn insert_condition(&self, row: ConditionRow) {
        self.conditions.write().insert(row.id, row);
        self.pricing_namespace.bump();
    }

    pub fn insert_benefit(&self, row: BenefitRow) {
        self.benefits.write().insert(row.id, row);
        self.pricing_namespace.bump();
    }

    pub fn insert_offer(&self, offer: ConditionalOffer) {
        self.offers.write().insert(offer.id, offer);
        self.pricing_namespace.bump();
    }

    pub fn insert_group(&self, group: OfferGroup) -> AppResult<OfferGroup> {
        self.groups.insert(group)
    }

    /// Record a placed order's use of an offer
    pub fn record_usage(&self, offer_id: i64, freq: u32, discount: Decimal) -> AppResult<()> {
        let mut offers = self.offers.write();
        let offer = offers.get_mut(&offer_id).ok_or_else(|| offer_not_found(offer_id))?;
        offer.record_usage(freq, discount);
        self.pricing_namespace.bump();
        Ok(())
    }

    // ==================== Reads ====================

    pub fn product(&self, id: i64) -> Option<Product> {
        self.products.read().get(&id).cloned()
    }

    pub fn offer(&self, id: i64) -> Option<ConditionalOffer> {
        self.offers.read().get(&id).cloned()
    }

    /// Offers of one type, by id
    pub fn offers_of_type(&self, offer_type: OfferType) -> Vec<ConditionalOffer> {
        let mut offers: Vec<ConditionalOffer> = self
            .offers
            .read()
            .values()
            .filter(|o| o.offer_type == offer_type)
            .cloned()
            .collect();
        offers.sort_by_key(|o| o.id);
        offers
    }

    /// Resolve an offer's condition, benefit and group
    pub fn prepare(
        &self,
        offer: ConditionalOffer,
        voucher: Option<VoucherRef>,
    ) -> AppResult<PreparedOffer> {
        let condition = self
            .condition_row(offer.condition_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::ConditionNotFound)
                    .with_detail("condition_id", offer.condition_id)
            })?
            .proxy(self)?;
        let benefit = self
            .benefit_row(offer.benefit_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::BenefitNotFound).with_detail("benefit_id", offer.benefit_id)
            })?
            .proxy(self)?;
        let group = match offer.offer_group_id {
            Some(group_id) => Some(self.groups.get(group_id).ok_or_else(|| {
                AppError::new(ErrorCode::OfferGroupNotFound).with_detail("group_id", group_id)
            })?),
            None => None,
        };
        Ok(PreparedOffer {
            offer,
            condition,
            benefit,
            group,
            voucher,
        })
    }

    /// Prepare every offer, skipping (and logging) the ones that fail to resolve
    pub fn prepare_all(
        &self,
        offers: Vec<ConditionalOffer>,
        voucher: Option<&VoucherRef>,
    ) -> Vec<PreparedOffer> {
        offers
            .into_iter()
            .filter_map(|offer| {
                let offer_id = offer.id;
                match self.prepare(offer, voucher.cloned()) {
                    Ok(prepared) => Some(prepared),
                    Err(e) => {
                        tracing::warn!(offer_id, error = %e, "Skipping offer that cannot be resolved");
                        None
                    }
                }
            })
            .collect()
    }
}

impl CatalogLookup for OfferCatalog {
    fn range(&self, id: i64) -> Option<ProductRange> {
        self.ranges.read().get(&id).cloned()
    }

    fn condition_row(&self, id: i64) -> Option<ConditionRow> {
        self.conditions.read().get(&id).cloned()
    }

    fn benefit_row(&self, id: i64) -> Option<BenefitRow> {
        self.benefits.read().get(&id).cloned()
    }
}

fn offer_not_found(offer_id: i64) -> AppError {
    AppError::new(ErrorCode::OfferNotFound).with_detail("offer_id", offer_id)
}
