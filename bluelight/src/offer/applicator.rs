//! Offer applicator
//!
//! Gathers the offers a basket is eligible for (site, voucher and user
//! offers) and applies them group by group.
//!
//! Within a group a basket item can be consumed by one offer only. The
//! per-group bookkeeping is reset for each group, which lets several groups
//! discount the same line.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Customer, OfferStatus, OfferType, Product};

use super::catalog::{OfferCatalog, PreparedOffer};
use super::groups::group_offers;
use super::hooks::ApplicatorHooks;
use super::results::OfferApplications;
use crate::basket::Basket;
use crate::core::Config;
use crate::pricing::{CosmeticPriceCache, CosmeticPriceKey};
use crate::voucher::VoucherStore;

#[derive(Clone)]
pub struct Applicator {
    catalog: OfferCatalog,
    vouchers: VoucherStore,
    config: Config,
    hooks: Vec<Arc<dyn ApplicatorHooks>>,
    cosmetic_prices: Arc<CosmeticPriceCache>,
}

impl std::fmt::Debug for Applicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applicator")
            .field("catalog", &self.catalog)
            .field("vouchers", &self.vouchers)
            .field("hooks_count", &self.hooks.len())
            .field("cosmetic_prices_count", &self.cosmetic_prices.len())
            .finish()
    }
}

impl Applicator {
    pub fn new(catalog: OfferCatalog, vouchers: VoucherStore, config: Config) -> Self {
        let cosmetic_prices = Arc::new(CosmeticPriceCache::with_namespace(
            Duration::from_secs(config.cosmetic_price_cache_ttl),
            catalog.pricing_namespace().clone(),
        ));
        Self {
            catalog,
            vouchers,
            config,
            hooks: Vec::new(),
            cosmetic_prices,
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn ApplicatorHooks>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn catalog(&self) -> &OfferCatalog {
        &self.catalog
    }

    pub fn vouchers(&self) -> &VoucherStore {
        &self.vouchers
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Offer sources
    // =========================================================================

    /// Site offers available at `now`
    pub fn get_site_offers(&self, now: i64) -> Vec<PreparedOffer> {
        let offers = self
            .catalog
            .offers_of_type(OfferType::Site)
            .into_iter()
            .filter(|o| o.is_available(now))
            .collect();
        self.catalog.prepare_all(offers, None)
    }

    /// Offers of the vouchers added to a saved basket
    ///
    /// Vouchers are visited by id. A voucher contributes its offers when it
    /// is active and available to the customer.
    pub fn get_basket_offers(
        &self,
        basket: &Basket,
        customer: &Customer,
        now: i64,
    ) -> Vec<PreparedOffer> {
        if basket.id.is_none() {
            return Vec::new();
        }
        let mut voucher_ids = basket.voucher_ids.clone();
        voucher_ids.sort_unstable();
        voucher_ids.dedup();

        let mut prepared = Vec::new();
        for voucher_id in voucher_ids {
            let Some(voucher) = self.vouchers.get(voucher_id) else {
                tracing::warn!(voucher_id, "Basket references a missing voucher");
                continue;
            };
            let (available, message) = self.vouchers.is_available_to_user(
                &voucher,
                Some(customer),
                &self.config.ignored_order_statuses,
            );
            if !voucher.is_active(now) || !available {
                tracing::debug!(voucher_id, reason = %message, "Voucher skipped");
                continue;
            }
            let offers = voucher
                .offer_ids
                .iter()
                .filter_map(|&offer_id| {
                    let offer = self.catalog.offer(offer_id);
                    if offer.is_none() {
                        tracing::warn!(voucher_id, offer_id, "Voucher references a missing offer");
                    }
                    offer
                })
                .collect();
            prepared.extend(self.catalog.prepare_all(offers, Some(&voucher.voucher_ref())));
        }
        prepared
    }

    /// Open user offers shared with one of the customer's groups
    pub fn get_user_offers(&self, customer: &Customer, now: i64) -> Vec<PreparedOffer> {
        if !customer.is_authenticated {
            return Vec::new();
        }
        let offers = self
            .catalog
            .offers_of_type(OfferType::User)
            .into_iter()
            .filter(|o| o.status == OfferStatus::Open)
            .filter(|o| match (o.start_datetime, o.end_datetime) {
                (None, None) => true,
                (Some(start), end) => start <= now && end.is_none_or(|end| end >= now),
                (None, Some(_)) => false,
            })
            .filter(|o| customer.is_member_of_any(&o.user_group_ids))
            .collect();
        self.catalog.prepare_all(offers, None)
    }

    /// Every offer the basket is eligible for, highest priority first
    ///
    /// Ties keep the order voucher, user, site.
    pub fn get_offers(&self, basket: &Basket, customer: &Customer, now: i64) -> Vec<PreparedOffer> {
        let mut offers = self.get_basket_offers(basket, customer, now);
        offers.extend(self.get_user_offers(customer, now));
        offers.extend(self.get_site_offers(now));
        offers.sort_by(|a, b| b.offer.priority.cmp(&a.offer.priority));
        offers
    }

    // =========================================================================
    // Application
    // =========================================================================

    pub fn apply(&self, basket: &mut Basket, customer: &Customer) {
        self.apply_at(basket, customer, Utc::now().timestamp_millis());
    }

    /// Reset the basket and apply every eligible offer as of `now` (Unix millis)
    pub fn apply_at(&self, basket: &mut Basket, customer: &Customer, now: i64) {
        basket.reset_offer_applications();
        let offers = self.get_offers(basket, customer, now);
        self.apply_offers(basket, customer, offers, false);
    }

    /// Apply offers in group priority order, then offer priority order
    ///
    /// Each offer keeps applying until it reaches its maximum number of
    /// applications, fails to apply, or returns a final result. In cosmetic
    /// mode only offers that affect cosmetic pricing are applied.
    pub fn apply_offers(
        &self,
        basket: &mut Basket,
        customer: &Customer,
        offers: Vec<PreparedOffer>,
        cosmetic: bool,
    ) {
        for hook in &self.hooks {
            hook.pre_offers_apply(basket, &offers);
        }
        let mut applications = OfferApplications::new();
        basket.clear_offer_upsells();

        let offers: Vec<PreparedOffer> = if cosmetic {
            offers
                .into_iter()
                .filter(|o| o.offer.affects_cosmetic_pricing)
                .collect()
        } else {
            offers
        };

        let groups = group_offers(offers.clone());
        for (group_priority, offers_in_group) in &groups {
            let group = offers_in_group.first().and_then(|o| o.group.as_ref());
            tracing::debug!(
                group_priority,
                group = group.map(|g| g.name.as_str()).unwrap_or("(none)"),
                offers = offers_in_group.len(),
                "Applying offer group"
            );
            for hook in &self.hooks {
                hook.pre_offer_group_apply(basket, group, offers_in_group);
            }
            for line in &mut basket.lines {
                line.begin_offer_group_application();
            }

            for prepared in offers_in_group {
                self.apply_offer(basket, customer, prepared, &mut applications);

                // Upsells must see this group's consumption, before it closes
                if !prepared.is_condition_satisfied(basket)
                    && prepared.is_condition_partially_satisfied(basket)
                    && let Some(upsell) = prepared.get_upsell_details(basket)
                {
                    basket.add_offer_upsell(&upsell);
                }
            }

            for line in &mut basket.lines {
                line.end_offer_group_application();
            }
            for hook in &self.hooks {
                hook.post_offer_group_apply(basket, group, offers_in_group);
            }
        }

        for line in &mut basket.lines {
            line.finalize_offer_group_applications();
        }
        basket.offer_applications = applications;
        for hook in &self.hooks {
            hook.post_offers_apply(basket, &offers);
        }
    }

    fn apply_offer(
        &self,
        basket: &mut Basket,
        customer: &Customer,
        prepared: &PreparedOffer,
        applications: &mut OfferApplications,
    ) {
        let offer_id = prepared.offer.id;
        let max_applications = prepared.offer.get_max_applications(
            customer.applications_of(offer_id),
            self.config.max_offer_applications,
        );
        let mut num_applications = 0;
        while num_applications < max_applications {
            let result = prepared.apply_benefit(basket);
            num_applications += 1;
            if !result.is_successful() {
                break;
            }
            applications.add(prepared, &result);
            tracing::debug!(
                offer_id,
                kind = ?result.kind,
                discount = %result.discount,
                "Offer applied"
            );
            if result.is_final() {
                break;
            }
        }
    }

    // =========================================================================
    // Cosmetic pricing
    // =========================================================================

    /// Unit price excluding tax after site offers, for a product alone in a basket
    ///
    /// Results are cached per product, quantity and unit price until the
    /// catalog changes or the TTL expires.
    pub fn get_cosmetic_price(
        &self,
        product: &Product,
        unit_price_excl_tax: Decimal,
        unit_tax: Option<Decimal>,
        quantity: u32,
    ) -> AppResult<Decimal> {
        if quantity == 0 {
            return Err(AppError::new(ErrorCode::InvalidQuantity).with_detail("quantity", quantity));
        }
        let key = CosmeticPriceKey {
            product_id: product.id,
            quantity,
            unit_price_excl_tax,
            unit_tax,
        };
        self.cosmetic_prices
            .get_or_try_insert_with(key, || {
                let now = Utc::now().timestamp_millis();
                let mut basket = Basket::new(self.config.default_currency.as_str());
                let total_before = basket.total_excl_tax();
                basket.add_product(product.clone(), quantity, Some(unit_price_excl_tax), unit_tax);
                let offers = self.get_site_offers(now);
                self.apply_offers(&mut basket, &Customer::anonymous(), offers, true);
                let total_after = basket.total_excl_tax();
                Ok((total_after - total_before) / Decimal::from(quantity))
            })
    }

    /// Drop every cached cosmetic price
    ///
    /// Catalog writes already do this; use it after changing state the
    /// catalog doesn't see.
    pub fn invalidate_cosmetic_prices(&self) {
        self.cosmetic_prices.invalidate();
    }
}
