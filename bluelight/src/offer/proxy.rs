//! Proxy resolution
//!
//! Condition and benefit rows are stored generically with a type tag
//! (`proxy_class`). Resolution turns a row into its behavioral variant,
//! resolving compound children recursively. Resolving something that is
//! already resolved returns an equal clone.

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{BenefitRow, ConditionRow, ProductRange};

use super::benefits::{
    AbsoluteBenefit, Benefit, BenefitBase, BenefitBehavior, CompoundBenefit, FixedPriceBenefit,
    FixedPricePerItemBenefit, MultibuyBenefit, PercentageBenefit, ShippingAbsoluteBenefit,
    ShippingFixedPriceBenefit, ShippingPercentageBenefit,
};
use super::conditions::{
    CompoundCondition, Condition, CountCondition, CoverageCondition, ValueCondition,
};

/// Read access to the rows proxies resolve against
pub trait CatalogLookup {
    fn range(&self, id: i64) -> Option<ProductRange>;
    fn condition_row(&self, id: i64) -> Option<ConditionRow>;
    fn benefit_row(&self, id: i64) -> Option<BenefitRow>;
}

/// Something that resolves to a [`Condition`]
pub trait ConditionProxy {
    fn proxy(&self, lookup: &dyn CatalogLookup) -> AppResult<Condition>;
}

impl ConditionProxy for ConditionRow {
    fn proxy(&self, lookup: &dyn CatalogLookup) -> AppResult<Condition> {
        resolve_condition(self, lookup)
    }
}

impl ConditionProxy for Condition {
    fn proxy(&self, _lookup: &dyn CatalogLookup) -> AppResult<Condition> {
        Ok(self.clone())
    }
}

/// Something that resolves to a [`Benefit`]
pub trait BenefitProxy {
    fn proxy(&self, lookup: &dyn CatalogLookup) -> AppResult<Benefit>;
}

impl BenefitProxy for BenefitRow {
    fn proxy(&self, lookup: &dyn CatalogLookup) -> AppResult<Benefit> {
        resolve_benefit(self, lookup)
    }
}

impl BenefitProxy for Benefit {
    fn proxy(&self, _lookup: &dyn CatalogLookup) -> AppResult<Benefit> {
        Ok(self.clone())
    }
}

// ==================== Conditions ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionKind {
    Count,
    Coverage,
    Value,
    TaxInclusiveValue,
    Compound,
}

fn parse_condition_kind(tag: &str) -> AppResult<ConditionKind> {
    match tag.trim().to_ascii_lowercase().as_str() {
        "count" => Ok(ConditionKind::Count),
        "coverage" => Ok(ConditionKind::Coverage),
        "value" => Ok(ConditionKind::Value),
        "tax_inclusive_value" => Ok(ConditionKind::TaxInclusiveValue),
        "compound" => Ok(ConditionKind::Compound),
        _ => Err(AppError::unknown_condition_type(tag)),
    }
}

pub fn resolve_condition(row: &ConditionRow, lookup: &dyn CatalogLookup) -> AppResult<Condition> {
    let mut visiting = Vec::new();
    resolve_condition_inner(row, lookup, &mut visiting)
}

fn resolve_condition_inner(
    row: &ConditionRow,
    lookup: &dyn CatalogLookup,
    visiting: &mut Vec<i64>,
) -> AppResult<Condition> {
    if visiting.contains(&row.id) {
        return Err(AppError::new(ErrorCode::ConditionCycle).with_detail("condition_id", row.id));
    }
    Ok(match parse_condition_kind(&row.proxy_class)? {
        ConditionKind::Count => {
            let (range, value) = range_and_value(row, lookup)?;
            Condition::Count(CountCondition {
                id: row.id,
                range,
                value: whole_units(row.id, value)?,
            })
        }
        ConditionKind::Coverage => {
            let (range, value) = range_and_value(row, lookup)?;
            Condition::Coverage(CoverageCondition {
                id: row.id,
                range,
                value: whole_units(row.id, value)?,
            })
        }
        kind @ (ConditionKind::Value | ConditionKind::TaxInclusiveValue) => {
            let (range, value) = range_and_value(row, lookup)?;
            Condition::Value(ValueCondition {
                id: row.id,
                range,
                value,
                tax_inclusive: kind == ConditionKind::TaxInclusiveValue,
            })
        }
        ConditionKind::Compound => resolve_compound_condition(row, lookup, visiting)?,
    })
}

fn resolve_compound_condition(
    row: &ConditionRow,
    lookup: &dyn CatalogLookup,
    visiting: &mut Vec<i64>,
) -> AppResult<Condition> {
    if row.range_id.is_some() {
        return Err(compound_invalid(row.id, "Compound conditions should not have a range."));
    }
    if row.value.is_some_and(|v| !v.is_zero()) {
        return Err(compound_invalid(row.id, "Compound conditions should not have a value."));
    }
    let mut child_ids: Vec<i64> = row
        .subcondition_ids
        .iter()
        .copied()
        .filter(|&id| id != row.id)
        .collect();
    child_ids.sort_unstable();
    child_ids.dedup();

    visiting.push(row.id);
    let mut children = Vec::with_capacity(child_ids.len());
    for id in child_ids {
        let child = lookup.condition_row(id).ok_or_else(|| {
            AppError::new(ErrorCode::ConditionNotFound).with_detail("condition_id", id)
        })?;
        children.push(resolve_condition_inner(&child, lookup, visiting)?);
    }
    visiting.pop();

    Ok(Condition::Compound(CompoundCondition {
        id: row.id,
        conjunction: row.conjunction,
        children,
    }))
}

/// Range and positive value every simple condition needs
fn range_and_value(row: &ConditionRow, lookup: &dyn CatalogLookup) -> AppResult<(ProductRange, Decimal)> {
    let range_id = row.range_id.ok_or_else(|| {
        AppError::new(ErrorCode::ConditionRangeRequired).with_detail("condition_id", row.id)
    })?;
    let range = lookup.range(range_id).ok_or_else(|| {
        AppError::new(ErrorCode::RangeNotFound).with_detail("range_id", range_id)
    })?;
    let value = row
        .value
        .filter(|v| *v > Decimal::ZERO)
        .ok_or_else(|| {
            AppError::new(ErrorCode::ConditionValueRequired).with_detail("condition_id", row.id)
        })?;
    Ok((range, value))
}

fn compound_invalid(id: i64, message: &str) -> AppError {
    AppError::with_message(ErrorCode::CompoundConditionInvalid, message).with_detail("condition_id", id)
}

/// Item counts are whole numbers; fractional values round up
fn whole_units(id: i64, value: Decimal) -> AppResult<u32> {
    value.ceil().to_u32().ok_or_else(|| {
        AppError::with_message(ErrorCode::ValueOutOfRange, "Condition value is too large")
            .with_detail("condition_id", id)
    })
}

// ==================== Benefits ====================

pub fn resolve_benefit(row: &BenefitRow, lookup: &dyn CatalogLookup) -> AppResult<Benefit> {
    let mut visiting = Vec::new();
    resolve_benefit_inner(row, lookup, &mut visiting)
}

fn resolve_benefit_inner(
    row: &BenefitRow,
    lookup: &dyn CatalogLookup,
    visiting: &mut Vec<i64>,
) -> AppResult<Benefit> {
    if visiting.contains(&row.id) {
        return Err(AppError::new(ErrorCode::BenefitCycle).with_detail("benefit_id", row.id));
    }
    let range = match row.range_id {
        Some(range_id) => Some(lookup.range(range_id).ok_or_else(|| {
            AppError::new(ErrorCode::RangeNotFound).with_detail("range_id", range_id)
        })?),
        None => None,
    };
    let base = BenefitBase {
        id: row.id,
        range,
        value: row.value,
        max_affected_items: row.max_affected_items,
        max_discount: row.max_discount,
    };

    let benefit = match row.proxy_class.trim().to_ascii_lowercase().as_str() {
        "percentage" => Benefit::Percentage(PercentageBenefit { base }),
        "absolute" => Benefit::Absolute(AbsoluteBenefit { base }),
        "fixed_price" => Benefit::FixedPrice(FixedPriceBenefit { base }),
        "fixed_price_per_item" => Benefit::FixedPricePerItem(FixedPricePerItemBenefit { base }),
        "multibuy" => Benefit::Multibuy(MultibuyBenefit { base }),
        "shipping_absolute" => Benefit::ShippingAbsolute(ShippingAbsoluteBenefit { base }),
        "shipping_fixed_price" => Benefit::ShippingFixedPrice(ShippingFixedPriceBenefit { base }),
        "shipping_percentage" => Benefit::ShippingPercentage(ShippingPercentageBenefit { base }),
        "compound" => {
            let mut child_ids: Vec<i64> = row
                .subbenefit_ids
                .iter()
                .copied()
                .filter(|&id| id != row.id)
                .collect();
            child_ids.sort_unstable();
            child_ids.dedup();

            visiting.push(row.id);
            let mut children = Vec::with_capacity(child_ids.len());
            for id in child_ids {
                let child = lookup.benefit_row(id).ok_or_else(|| {
                    AppError::new(ErrorCode::BenefitNotFound).with_detail("benefit_id", id)
                })?;
                children.push(resolve_benefit_inner(&child, lookup, visiting)?);
            }
            visiting.pop();
            Benefit::Compound(CompoundBenefit { base, children })
        }
        _ => return Err(AppError::unknown_benefit_type(&row.proxy_class)),
    };
    benefit.clean()?;
    Ok(benefit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Conjunction;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Rows {
        ranges: HashMap<i64, ProductRange>,
        conditions: HashMap<i64, ConditionRow>,
        benefits: HashMap<i64, BenefitRow>,
    }

    impl CatalogLookup for Rows {
        fn range(&self, id: i64) -> Option<ProductRange> {
            self.ranges.get(&id).cloned()
        }
        fn condition_row(&self, id: i64) -> Option<ConditionRow> {
            self.conditions.get(&id).cloned()
        }
        fn benefit_row(&self, id: i64) -> Option<BenefitRow> {
            self.benefits.get(&id).cloned()
        }
    }

    fn make_rows() -> Rows {
        let mut rows = Rows::default();
        rows.ranges.insert(1, ProductRange::all_products(1, "All"));
        for row in [
            ConditionRow::new(1, "count").with_range(1, Decimal::from(2)),
            ConditionRow::new(2, "VALUE").with_range(1, Decimal::from(20)),
            ConditionRow::new(3, "tax_inclusive_value").with_range(1, Decimal::from(20)),
            ConditionRow::new(4, "compound").with_children(Conjunction::Or, vec![2, 1, 4]),
            ConditionRow::new(5, "compound").with_children(Conjunction::And, vec![6]),
            ConditionRow::new(6, "compound").with_children(Conjunction::And, vec![5]),
        ] {
            rows.conditions.insert(row.id, row);
        }
        rows
    }

    #[test]
    fn test_resolves_simple_conditions() {
        let rows = make_rows();
        let count = rows.conditions[&1].proxy(&rows).unwrap();
        assert!(matches!(count, Condition::Count(CountCondition { value: 2, .. })));
        let value = rows.conditions[&2].proxy(&rows).unwrap();
        assert_eq!(value.proxy_class(), "value");
        let tax = rows.conditions[&3].proxy(&rows).unwrap();
        assert_eq!(tax.proxy_class(), "tax_inclusive_value");
    }

    #[test]
    fn test_compound_children_in_id_order_without_self() {
        let rows = make_rows();
        match rows.conditions[&4].proxy(&rows).unwrap() {
            Condition::Compound(compound) => {
                let ids: Vec<i64> = compound.children.iter().map(Condition::id).collect();
                assert_eq!(ids, vec![1, 2]);
                assert_eq!(compound.conjunction, Conjunction::Or);
            }
            other => panic!("expected compound, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let rows = make_rows();
        let once = rows.conditions[&4].proxy(&rows).unwrap();
        let twice = once.proxy(&rows).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.proxy_class(), twice.proxy_class());
    }

    #[test]
    fn test_unknown_type_is_classification_error() {
        let rows = make_rows();
        let err = ConditionRow::new(9, "mystery").proxy(&rows).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownConditionType);
        let err = BenefitRow::new(9, "mystery").proxy(&rows).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownBenefitType);
    }

    #[test]
    fn test_cycles_are_rejected() {
        let rows = make_rows();
        let err = rows.conditions[&5].proxy(&rows).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConditionCycle);
    }

    #[test]
    fn test_validation_errors() {
        let rows = make_rows();
        let err = ConditionRow::new(9, "count").proxy(&rows).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConditionRangeRequired);
        let mut zero = ConditionRow::new(9, "count").with_range(1, Decimal::ZERO);
        assert_eq!(zero.proxy(&rows).unwrap_err().code, ErrorCode::ConditionValueRequired);
        zero.proxy_class = "compound".into();
        assert_eq!(zero.proxy(&rows).unwrap_err().code, ErrorCode::CompoundConditionInvalid);
    }

    #[test]
    fn test_resolves_benefits() {
        let mut rows = make_rows();
        rows.benefits.insert(
            1,
            BenefitRow::new(1, "Percentage").with_range(1).with_value(Decimal::from(10)),
        );
        rows.benefits.insert(
            2,
            BenefitRow::new(2, "shipping_absolute").with_value(Decimal::from(5)),
        );
        let mut compound = BenefitRow::new(3, "compound");
        compound.subbenefit_ids = vec![2, 1, 3];
        rows.benefits.insert(3, compound);

        match rows.benefits[&3].proxy(&rows).unwrap() {
            Benefit::Compound(compound) => {
                let ids: Vec<i64> = compound.children.iter().map(Benefit::id).collect();
                assert_eq!(ids, vec![1, 2]);
            }
            other => panic!("expected compound, got {:?}", other),
        }

        let invalid = BenefitRow::new(4, "percentage").with_value(Decimal::from(10));
        assert_eq!(invalid.proxy(&rows).unwrap_err().code, ErrorCode::BenefitInvalid);
    }
}
