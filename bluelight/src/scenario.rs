//! JSON scenarios
//!
//! A scenario bundles a catalog (ranges, products, condition and benefit
//! rows, offer groups, offers, vouchers), a customer and a basket. Running
//! it applies offers and produces a serializable report.

use std::path::Path;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    BenefitRow, ConditionRow, ConditionalOffer, Customer, OfferApplication, OfferGroup, Product,
    ProductRange, Voucher,
};
use thiserror::Error;

use crate::basket::{Basket, LineDiscountDescription, LinePriceBreakdownItem};
use crate::core::Config;
use crate::offer::{Applicator, OfferCatalog};
use crate::utils::money::round_half_up;
use crate::voucher::VoucherStore;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] AppError),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

// =============================================================================
// Input
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioLine {
    pub product_id: i64,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price_excl_tax: Option<Decimal>,
    #[serde(default)]
    pub unit_tax: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioBasket {
    /// Vouchers only apply to saved baskets, i.e. baskets with an id
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub lines: Vec<ScenarioLine>,
    #[serde(default)]
    pub voucher_codes: Vec<String>,
    #[serde(default)]
    pub shipping_charge: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub ranges: Vec<ProductRange>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub conditions: Vec<ConditionRow>,
    #[serde(default)]
    pub benefits: Vec<BenefitRow>,
    #[serde(default)]
    pub groups: Vec<OfferGroup>,
    #[serde(default)]
    pub offers: Vec<ConditionalOffer>,
    #[serde(default)]
    pub vouchers: Vec<Voucher>,
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub basket: ScenarioBasket,
    /// Evaluation time (Unix millis), defaults to the current time
    #[serde(default)]
    pub now: Option<i64>,
}

impl Scenario {
    pub fn from_path(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ScenarioResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn now(&self) -> i64 {
        self.now.unwrap_or_else(|| Utc::now().timestamp_millis())
    }

    /// Load the catalog and vouchers into a new applicator
    pub fn build_applicator(&self, config: Config) -> ScenarioResult<Applicator> {
        let catalog = OfferCatalog::new();
        for range in &self.ranges {
            catalog.insert_range(range.clone());
        }
        for product in &self.products {
            catalog.insert_product(product.clone());
        }
        for row in &self.conditions {
            catalog.insert_condition(row.clone());
        }
        for row in &self.benefits {
            catalog.insert_benefit(row.clone());
        }
        for group in &self.groups {
            catalog.insert_group(group.clone())?;
        }
        for offer in &self.offers {
            catalog.insert_offer(offer.clone());
        }

        let vouchers = VoucherStore::new();
        for voucher in &self.vouchers {
            vouchers.insert(voucher.clone())?;
        }

        tracing::debug!(
            offers = self.offers.len(),
            vouchers = self.vouchers.len(),
            "Scenario catalog loaded"
        );
        Ok(Applicator::new(catalog, vouchers, config))
    }

    /// Build the basket, resolving products and voucher codes against the applicator
    pub fn build_basket(&self, applicator: &Applicator) -> ScenarioResult<Basket> {
        let currency = self
            .basket
            .currency
            .clone()
            .unwrap_or_else(|| applicator.config().default_currency.clone());
        let mut basket = Basket::new(currency);
        basket.id = self.basket.id;
        basket.shipping_charge = self.basket.shipping_charge;

        for line in &self.basket.lines {
            let product = applicator.catalog().product(line.product_id).ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", line.product_id)
            })?;
            if line.quantity == 0 {
                return Err(AppError::new(ErrorCode::InvalidQuantity)
                    .with_detail("product_id", line.product_id)
                    .into());
            }
            basket.add_product(product, line.quantity, line.unit_price_excl_tax, line.unit_tax);
        }
        for code in &self.basket.voucher_codes {
            let voucher = applicator.vouchers().get_by_code(code).ok_or_else(|| {
                AppError::new(ErrorCode::VoucherNotFound).with_detail("code", code.as_str())
            })?;
            applicator.vouchers().record_basket_addition(voucher.id)?;
            basket.add_voucher(voucher.id);
        }
        Ok(basket)
    }

    /// Apply offers to the scenario's basket and report the outcome
    pub fn run(&self, config: Config) -> ScenarioResult<ScenarioReport> {
        let applicator = self.build_applicator(config)?;
        let mut basket = self.build_basket(&applicator)?;
        applicator.apply_at(&mut basket, &self.customer, self.now());
        Ok(ScenarioReport::from_basket(&applicator, &mut basket))
    }
}

// =============================================================================
// Report
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub line_id: i64,
    pub product_id: i64,
    pub title: String,
    pub quantity: u32,
    pub affected_quantity: u32,
    pub discount: Decimal,
    pub line_price_excl_tax_incl_discounts: Option<Decimal>,
    pub discounts: Vec<LineDiscountDescription>,
    /// `None` while the line's tax is unknown
    pub price_breakdown: Option<Vec<LinePriceBreakdownItem>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoucherDiscountReport {
    pub code: String,
    pub name: String,
    pub discount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsReport {
    pub excl_tax_excl_discounts: Decimal,
    pub discount: Decimal,
    pub excl_tax: Decimal,
    pub tax: Option<Decimal>,
    pub incl_tax: Option<Decimal>,
    pub shipping_charge: Option<Decimal>,
    pub shipping_discount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub currency: String,
    /// In first-application order
    pub applications: Vec<OfferApplication>,
    pub voucher_discounts: Vec<VoucherDiscountReport>,
    pub lines: Vec<LineReport>,
    pub upsells: Vec<String>,
    pub totals: TotalsReport,
}

impl ScenarioReport {
    pub fn from_basket(applicator: &Applicator, basket: &mut Basket) -> Self {
        let shipping_discount = shipping_discount(applicator, basket);
        let upsells = basket
            .get_offer_upsells()
            .iter()
            .map(|u| u.summary())
            .collect();
        let lines = basket
            .lines
            .iter_mut()
            .map(|line| LineReport {
                line_id: line.id,
                product_id: line.product.id,
                title: line.product.title.clone(),
                quantity: line.quantity(),
                affected_quantity: line.quantity_with_discount(),
                discount: line.discount_value(),
                line_price_excl_tax_incl_discounts: line.line_price_excl_tax_incl_discounts(),
                discounts: line.discount_descriptions().to_vec(),
                price_breakdown: line.get_price_breakdown().ok(),
            })
            .collect();
        let voucher_discounts = basket
            .offer_applications
            .grouped_voucher_discounts()
            .into_iter()
            .map(|(voucher, discount)| VoucherDiscountReport {
                code: voucher.code,
                name: voucher.name,
                discount,
            })
            .collect();

        Self {
            currency: basket.currency.clone(),
            applications: basket.offer_applications.iter().cloned().collect(),
            voucher_discounts,
            lines,
            upsells,
            totals: TotalsReport {
                excl_tax_excl_discounts: basket.total_excl_tax_excl_discounts(),
                discount: basket.total_discount(),
                excl_tax: basket.total_excl_tax(),
                tax: basket.total_tax().map(round_half_up),
                incl_tax: basket.total_incl_tax().map(round_half_up),
                shipping_charge: basket.shipping_charge,
                shipping_discount,
            },
        }
    }
}

/// Discount the applied shipping offers give on the basket's shipping charge
///
/// Offers are visited in application order, each discounting what the
/// previous ones left.
fn shipping_discount(applicator: &Applicator, basket: &Basket) -> Decimal {
    let Some(charge) = basket.shipping_charge else {
        return Decimal::ZERO;
    };
    let mut remaining = charge;
    for application in basket.offer_applications.shipping_discounts() {
        let Some(offer) = applicator.catalog().offer(application.offer_id) else {
            continue;
        };
        match applicator.catalog().prepare(offer, application.voucher.clone()) {
            Ok(prepared) => remaining -= prepared.shipping_discount(remaining),
            Err(e) => {
                tracing::warn!(offer_id = application.offer_id, error = %e, "Shipping offer skipped");
            }
        }
    }
    charge - remaining
}
