//! Shared fixtures for unit tests

use rust_decimal::Decimal;
use shared::models::{
    BenefitRow, ConditionRow, ConditionalOffer, OfferGroup, Product, ProductRange,
};

use crate::basket::Basket;
use crate::offer::benefits::{Benefit, BenefitBase, PercentageBenefit};
use crate::offer::catalog::{OfferCatalog, PreparedOffer};
use crate::offer::conditions::{Condition, CountCondition};

/// Range 1 "Shirts" (products 1 and 2), offer 1: 10% off when 2 shirts are in the basket
pub fn make_catalog() -> OfferCatalog {
    let catalog = OfferCatalog::new();
    catalog.insert_range(ProductRange::of_products(1, "Shirts", vec![1, 2]));
    catalog.insert_product(Product::new(1, "Shirt"));
    catalog.insert_product(Product::new(2, "Polo"));
    catalog.insert_condition(ConditionRow::new(1, "count").with_range(1, Decimal::from(2)));
    catalog.insert_benefit(
        BenefitRow::new(1, "percentage")
            .with_range(1)
            .with_value(Decimal::from(10)),
    );
    catalog.insert_offer(ConditionalOffer::new(1, "10% off 2 shirts", 1, 1));
    catalog
}

/// Basket with `quantity` shirts at 20.00 plus 2.00 tax
pub fn shirt_basket(quantity: u32) -> Basket {
    let mut basket = Basket::new("USD");
    basket.add_product(
        Product::new(1, "Shirt"),
        quantity,
        Some(Decimal::from(20)),
        Some(Decimal::from(2)),
    );
    basket
}

/// 10% off everything once one item is in the basket
pub fn make_prepared_offer(id: i64, priority: i32, group: Option<OfferGroup>) -> PreparedOffer {
    let range = ProductRange::all_products(1, "Everything");
    let mut offer = ConditionalOffer::new(id, format!("Offer {}", id), id, id);
    offer.priority = priority;
    offer.offer_group_id = group.as_ref().map(|g| g.id);
    PreparedOffer {
        offer,
        condition: Condition::Count(CountCondition {
            id,
            range: range.clone(),
            value: 1,
        }),
        benefit: Benefit::Percentage(PercentageBenefit {
            base: BenefitBase {
                id,
                range: Some(range),
                value: Some(Decimal::from(10)),
                ..BenefitBase::default()
            },
        }),
        group,
        voucher: None,
    }
}
