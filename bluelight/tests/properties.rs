use proptest::prelude::*;
use rust_decimal::Decimal;

use bluelight::offer::{ConditionBehavior, ConditionProxy};
use bluelight::{Applicator, Basket, Config, ErrorCode, OfferCatalog, VoucherStore};
use shared::models::{
    BenefitRow, ConditionRow, ConditionalOffer, Conjunction, Customer, OfferGroup, Product,
    ProductRange,
};

const KNOWN_TAGS: [&str; 5] = ["count", "coverage", "value", "tax_inclusive_value", "compound"];

/// (product id, quantity, unit price)
fn lines_strategy() -> impl Strategy<Value = Vec<(i64, u32, i64)>> {
    prop::collection::vec((1i64..=4, 1u32..=5, 1i64..=50), 1..6)
}

/// (condition count, percentage, group, priority, exclusive)
fn offers_strategy() -> impl Strategy<Value = Vec<(u32, i64, Option<i64>, i32, bool)>> {
    prop::collection::vec(
        (1u32..=3, 5i64..=50, prop::option::of(1i64..=3), -2i32..=2, any::<bool>()),
        1..6,
    )
}

fn make_basket(lines: &[(i64, u32, i64)]) -> Basket {
    let mut basket = Basket::new("USD");
    for &(product_id, quantity, price) in lines {
        basket.add_product(
            Product::new(product_id, format!("Product {}", product_id)),
            quantity,
            Some(Decimal::from(price)),
            Some(Decimal::ZERO),
        );
    }
    basket
}

/// Range 1 holds products 1 and 2, range 2 holds 3 and 4, range 3 holds everything
fn base_catalog() -> OfferCatalog {
    let catalog = OfferCatalog::new();
    catalog.insert_range(ProductRange::of_products(1, "Tops", vec![1, 2]));
    catalog.insert_range(ProductRange::of_products(2, "Bottoms", vec![3, 4]));
    catalog.insert_range(ProductRange::all_products(3, "Everything"));
    for id in 1..=4 {
        catalog.insert_product(Product::new(id, format!("Product {}", id)));
    }
    catalog
}

fn make_applicator(offers: &[(u32, i64, Option<i64>, i32, bool)]) -> Applicator {
    let catalog = base_catalog();
    for (id, priority) in [(1, 10), (2, 20), (3, 30)] {
        catalog
            .insert_group(OfferGroup::new(id, format!("Group {}", id), priority))
            .unwrap();
    }
    for (i, &(count, percent, group, priority, exclusive)) in offers.iter().enumerate() {
        let id = i as i64 + 1;
        catalog.insert_condition(ConditionRow::new(id, "count").with_range(3, Decimal::from(count)));
        catalog.insert_benefit(
            BenefitRow::new(id, "percentage")
                .with_range(3)
                .with_value(Decimal::from(percent)),
        );
        let mut offer = ConditionalOffer::new(id, format!("Offer {}", id), id, id);
        offer.offer_group_id = group;
        offer.priority = priority;
        offer.exclusive = exclusive;
        catalog.insert_offer(offer);
    }
    Applicator::new(catalog, VoucherStore::new(), Config::with_overrides(60, vec![], 10000))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    /// Property: no line's affected quantity exceeds its quantity
    #[test]
    fn affected_quantity_never_exceeds_quantity(
        lines in lines_strategy(),
        offers in offers_strategy(),
    ) {
        let applicator = make_applicator(&offers);
        let mut basket = make_basket(&lines);
        applicator.apply_at(&mut basket, &Customer::anonymous(), 0);

        for line in &basket.lines {
            prop_assert!(line.quantity_with_discount() <= line.quantity());
            prop_assert!(line.consumer().global_affected_quantity() <= line.quantity());
            prop_assert!(line.line_price_excl_tax_incl_discounts().unwrap() >= Decimal::ZERO);
        }
    }

    /// Property: application indices strictly increase in collection order
    #[test]
    fn application_indices_strictly_increase(
        lines in lines_strategy(),
        offers in offers_strategy(),
    ) {
        let applicator = make_applicator(&offers);
        let mut basket = make_basket(&lines);
        applicator.apply_at(&mut basket, &Customer::anonymous(), 0);

        let indices: Vec<usize> = basket.offer_applications.iter().map(|a| a.index).collect();
        for (position, index) in indices.iter().enumerate() {
            prop_assert_eq!(*index, position);
        }
        prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    /// Property: AND needs every child, OR needs at least one
    #[test]
    fn compound_follows_boolean_semantics(
        lines in lines_strategy(),
        tops in 1u32..=6,
        bottoms in 1u32..=6,
        use_and in any::<bool>(),
    ) {
        let catalog = base_catalog();
        catalog.insert_condition(ConditionRow::new(1, "count").with_range(1, Decimal::from(tops)));
        catalog.insert_condition(ConditionRow::new(2, "count").with_range(2, Decimal::from(bottoms)));
        let conjunction = if use_and { Conjunction::And } else { Conjunction::Or };
        let compound = ConditionRow::new(3, "compound")
            .with_children(conjunction, vec![1, 2])
            .proxy(&catalog)
            .unwrap();
        let first = ConditionRow::new(1, "count")
            .with_range(1, Decimal::from(tops))
            .proxy(&catalog)
            .unwrap();
        let second = ConditionRow::new(2, "count")
            .with_range(2, Decimal::from(bottoms))
            .proxy(&catalog)
            .unwrap();

        let basket = make_basket(&lines);
        let offer = ConditionalOffer::new(1, "Compound", 3, 1);
        let a = first.is_satisfied(&offer, &basket);
        let b = second.is_satisfied(&offer, &basket);
        let expected = if use_and { a && b } else { a || b };
        prop_assert_eq!(compound.is_satisfied(&offer, &basket), expected);
    }

    /// Property: resolving a resolved condition returns it unchanged
    #[test]
    fn condition_proxy_is_idempotent(
        tag_index in 0usize..5,
        value in 1i64..=100,
        range_id in 1i64..=3,
    ) {
        let catalog = base_catalog();
        catalog.insert_condition(ConditionRow::new(1, "count").with_range(range_id, Decimal::from(value)));
        catalog.insert_condition(ConditionRow::new(2, "value").with_range(range_id, Decimal::from(value)));
        let row = match KNOWN_TAGS[tag_index] {
            "compound" => ConditionRow::new(3, "compound").with_children(Conjunction::Or, vec![1, 2]),
            tag => ConditionRow::new(3, tag).with_range(range_id, Decimal::from(value)),
        };

        let once = row.proxy(&catalog).unwrap();
        let twice = once.proxy(&catalog).unwrap();
        prop_assert_eq!(once.proxy_class(), twice.proxy_class());
        prop_assert_eq!(once, twice);
    }

    /// Property: unrecognised tags raise the classification error
    #[test]
    fn unknown_condition_type_is_rejected(tag in "[a-z_]{1,16}") {
        prop_assume!(!KNOWN_TAGS.contains(&tag.as_str()));
        let catalog = base_catalog();
        let err = ConditionRow::new(1, tag.as_str())
            .with_range(1, Decimal::ONE)
            .proxy(&catalog)
            .unwrap_err();
        prop_assert_eq!(err.code, ErrorCode::UnknownConditionType);
    }
}
