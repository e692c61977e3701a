//! Voucher store
//!
//! In-memory vouchers keyed by id. Codes are unique ignoring case. Parent
//! vouchers own child codes that mirror their settings.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Customer, Voucher, VoucherApplication};

use super::rules::{RuleContext, check_rules};

/// Attempts at finding an unused auto-generated child code
const MAX_CHILD_CODE_TRIES: u32 = 50;

#[derive(Clone, Default)]
pub struct VoucherStore {
    vouchers: Arc<RwLock<HashMap<i64, Voucher>>>,
}

impl std::fmt::Debug for VoucherStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let vouchers = self.vouchers.read();
        f.debug_struct("VoucherStore")
            .field("vouchers_count", &vouchers.len())
            .field(
                "children_count",
                &vouchers.values().filter(|v| v.is_child()).count(),
            )
            .finish()
    }
}

impl VoucherStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Writes ====================

    /// Insert or replace a voucher
    ///
    /// Fails when another voucher already uses the code, ignoring case.
    pub fn insert(&self, voucher: Voucher) -> AppResult<Voucher> {
        let mut vouchers = self.vouchers.write();
        if code_exists(&vouchers, &voucher.code, Some(voucher.id)) {
            return Err(code_exists_error(&voucher.code));
        }
        tracing::debug!(voucher_id = voucher.id, code = %voucher.code, "Voucher stored");
        vouchers.insert(voucher.id, voucher.clone());
        Ok(voucher)
    }

    /// Create child codes under a parent voucher
    ///
    /// `auto_count` codes are generated as `CODE-<index><3 random digits>`.
    /// Custom codes that already exist are reported in the returned error
    /// list instead of failing the whole call. Returns the errors and the
    /// number of children created.
    pub fn create_children(
        &self,
        parent_id: i64,
        auto_count: u32,
        custom_codes: &[String],
    ) -> AppResult<(Vec<String>, u32)> {
        let mut vouchers = self.vouchers.write();
        let parent = vouchers
            .get(&parent_id)
            .cloned()
            .ok_or_else(|| voucher_not_found(parent_id))?;
        if parent.is_child() {
            return Err(AppError::with_message(
                ErrorCode::NestedChildVoucher,
                "Can not create children for a child voucher. Nesting should only be 1 level.",
            )
            .with_detail("voucher_id", parent_id));
        }

        let mut errors = Vec::new();
        let mut success_count = 0;
        let mut rng = rand::thread_rng();
        for index in 0..auto_count {
            let code = next_child_code(&vouchers, &parent.code, index, auto_count, &mut rng)?;
            insert_child(&mut vouchers, &parent, code);
            success_count += 1;
        }
        for code in custom_codes {
            if code_exists(&vouchers, code, None) {
                errors.push(format!(
                    "Could not create code “{}” because it already exists.",
                    code
                ));
                continue;
            }
            insert_child(&mut vouchers, &parent, code.clone());
            success_count += 1;
        }

        tracing::info!(
            voucher_id = parent_id,
            created = success_count,
            rejected = errors.len(),
            "Child vouchers created"
        );
        Ok((errors, success_count))
    }

    /// Copy a parent's settings into every child, returning how many were updated
    pub fn update_children(&self, parent_id: i64) -> AppResult<usize> {
        let mut vouchers = self.vouchers.write();
        let parent = vouchers
            .get(&parent_id)
            .cloned()
            .ok_or_else(|| voucher_not_found(parent_id))?;
        let mut updated = 0;
        for child in vouchers
            .values_mut()
            .filter(|v| v.parent_id == Some(parent_id))
        {
            sync_child(&parent, child);
            updated += 1;
        }
        Ok(updated)
    }

    pub fn record_basket_addition(&self, voucher_id: i64) -> AppResult<()> {
        let mut vouchers = self.vouchers.write();
        let voucher = vouchers
            .get_mut(&voucher_id)
            .ok_or_else(|| voucher_not_found(voucher_id))?;
        voucher.num_basket_additions += 1;
        Ok(())
    }

    /// Record a placed order's use of a voucher
    ///
    /// A child's parent is credited with the application and the order too.
    pub fn record_usage(
        &self,
        voucher_id: i64,
        order_id: i64,
        customer: &Customer,
        order_status: &str,
    ) -> AppResult<()> {
        let mut vouchers = self.vouchers.write();
        let parent_id = vouchers
            .get(&voucher_id)
            .ok_or_else(|| voucher_not_found(voucher_id))?
            .parent_id;
        let application = VoucherApplication {
            order_id,
            user_id: customer.id.filter(|_| customer.is_authenticated),
            order_status: order_status.to_string(),
        };
        for id in parent_id.into_iter().chain(Some(voucher_id)) {
            if let Some(voucher) = vouchers.get_mut(&id) {
                voucher.applications.push(application.clone());
                voucher.num_orders += 1;
            }
        }
        Ok(())
    }

    /// Add an order's discount to a voucher and to its parent
    pub fn record_discount(&self, voucher_id: i64, discount: Decimal) -> AppResult<()> {
        let mut vouchers = self.vouchers.write();
        let parent_id = vouchers
            .get(&voucher_id)
            .ok_or_else(|| voucher_not_found(voucher_id))?
            .parent_id;
        for id in parent_id.into_iter().chain(Some(voucher_id)) {
            if let Some(voucher) = vouchers.get_mut(&id) {
                voucher.total_discount += discount;
            }
        }
        Ok(())
    }

    // ==================== Reads ====================

    /// Children are returned with their parent's name
    pub fn get(&self, id: i64) -> Option<Voucher> {
        let vouchers = self.vouchers.read();
        vouchers.get(&id).map(|v| with_parent_name(&vouchers, v))
    }

    pub fn get_by_code(&self, code: &str) -> Option<Voucher> {
        let vouchers = self.vouchers.read();
        vouchers
            .values()
            .find(|v| v.code.eq_ignore_ascii_case(code))
            .map(|v| with_parent_name(&vouchers, v))
    }

    /// Children of a voucher, by id
    pub fn children_of(&self, parent_id: i64) -> Vec<Voucher> {
        let vouchers = self.vouchers.read();
        let mut children: Vec<Voucher> = vouchers
            .values()
            .filter(|v| v.parent_id == Some(parent_id))
            .map(|v| with_parent_name(&vouchers, v))
            .collect();
        children.sort_by_key(|v| v.id);
        children
    }

    pub fn has_children(&self, id: i64) -> bool {
        self.vouchers
            .read()
            .values()
            .any(|v| v.parent_id == Some(id))
    }

    pub fn len(&self) -> usize {
        self.vouchers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vouchers.read().is_empty()
    }

    /// Whether the customer may use the voucher, with the reason when not
    pub fn is_available_to_user(
        &self,
        voucher: &Voucher,
        customer: Option<&Customer>,
        ignored_order_statuses: &[String],
    ) -> (bool, String) {
        let ctx = RuleContext {
            voucher,
            customer,
            has_children: self.has_children(voucher.id),
            ignored_order_statuses,
        };
        check_rules(&ctx)
    }
}

// =============================================================================
// Helpers (called with the lock held)
// =============================================================================

fn code_exists(vouchers: &HashMap<i64, Voucher>, code: &str, except_id: Option<i64>) -> bool {
    vouchers
        .values()
        .any(|v| Some(v.id) != except_id && v.code.eq_ignore_ascii_case(code))
}

fn next_child_code(
    vouchers: &HashMap<i64, Voucher>,
    parent_code: &str,
    index: u32,
    count: u32,
    rng: &mut impl Rng,
) -> AppResult<String> {
    let width = count.to_string().len();
    for _ in 0..MAX_CHILD_CODE_TRIES {
        let suffix: u32 = rng.gen_range(0..1000);
        let code = format!("{}-{:0width$}{:03}", parent_code, index, suffix, width = width);
        if !vouchers.values().any(|v| v.code == code) {
            return Ok(code);
        }
    }
    Err(AppError::with_message(
        ErrorCode::ChildCodeExhausted,
        format!(
            "Couldn't find a unique child code after {} iterations.",
            MAX_CHILD_CODE_TRIES
        ),
    )
    .with_detail("parent_code", parent_code))
}

fn insert_child(vouchers: &mut HashMap<i64, Voucher>, parent: &Voucher, code: String) {
    let id = vouchers.keys().max().copied().unwrap_or(0) + 1;
    let mut child = Voucher::new(
        id,
        parent.name.clone(),
        code,
        parent.start_datetime,
        parent.end_datetime,
    );
    sync_child(parent, &mut child);
    vouchers.insert(id, child);
}

fn sync_child(parent: &Voucher, child: &mut Voucher) {
    child.parent_id = Some(parent.id);
    child.name = parent.name.clone();
    child.usage = parent.usage;
    child.start_datetime = parent.start_datetime;
    child.end_datetime = parent.end_datetime;
    child.limit_usage_by_group = parent.limit_usage_by_group;
    child.group_ids = parent.group_ids.clone();
    child.offer_ids = parent.offer_ids.clone();
}

fn with_parent_name(vouchers: &HashMap<i64, Voucher>, voucher: &Voucher) -> Voucher {
    let mut voucher = voucher.clone();
    if let Some(parent) = voucher.parent_id.and_then(|id| vouchers.get(&id)) {
        voucher.name = parent.name.clone();
    }
    voucher
}

fn code_exists_error(code: &str) -> AppError {
    AppError::new(ErrorCode::VoucherCodeExists).with_detail("code", code)
}

fn voucher_not_found(voucher_id: i64) -> AppError {
    AppError::new(ErrorCode::VoucherNotFound).with_detail("voucher_id", voucher_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::VoucherUsage;

    fn make_store() -> VoucherStore {
        let store = VoucherStore::new();
        let mut parent = Voucher::new(1, "Spring sale", "SPRING", 0, 1_000);
        parent.usage = VoucherUsage::SingleUse;
        parent.offer_ids = vec![10];
        store.insert(parent).unwrap();
        store
    }

    #[test]
    fn test_insert_rejects_duplicate_code_ignoring_case() {
        let store = make_store();
        let err = store
            .insert(Voucher::new(2, "Other", "spring", 0, 1))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherCodeExists);
        // Replacing the same voucher keeps its code
        assert!(store.insert(Voucher::new(1, "Renamed", "SPRING", 0, 1)).is_ok());
        assert_eq!(store.get_by_code("Spring").unwrap().name, "Renamed");
    }

    #[test]
    fn test_create_children_auto_codes() {
        let store = make_store();
        let (errors, created) = store.create_children(1, 12, &[]).unwrap();
        assert!(errors.is_empty());
        assert_eq!(created, 12);

        let children = store.children_of(1);
        assert_eq!(children.len(), 12);
        for child in &children {
            // SPRING- + 2 index digits + 3 random digits
            assert!(child.code.starts_with("SPRING-"));
            assert_eq!(child.code.len(), "SPRING-".len() + 5);
            assert_eq!(child.usage, VoucherUsage::SingleUse);
            assert_eq!(child.offer_ids, vec![10]);
            assert_eq!(child.name, "Spring sale");
        }
        assert!(store.has_children(1));
    }

    #[test]
    fn test_create_children_custom_codes() {
        let store = make_store();
        store.insert(Voucher::new(5, "Taken", "TAKEN", 0, 1)).unwrap();
        let codes = vec!["FRIEND1".to_string(), "taken".to_string()];
        let (errors, created) = store.create_children(1, 0, &codes).unwrap();
        assert_eq!(created, 1);
        assert_eq!(
            errors,
            vec!["Could not create code “taken” because it already exists.".to_string()]
        );
        assert_eq!(store.get_by_code("friend1").unwrap().parent_id, Some(1));
    }

    #[test]
    fn test_children_can_not_have_children() {
        let store = make_store();
        store
            .create_children(1, 0, &["CHILD".to_string()])
            .unwrap();
        let child = store.get_by_code("CHILD").unwrap();
        let err = store.create_children(child.id, 1, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::NestedChildVoucher);
    }

    #[test]
    fn test_update_children_copies_parent_settings() {
        let store = make_store();
        store.create_children(1, 2, &[]).unwrap();

        let mut parent = store.get(1).unwrap();
        parent.name = "Summer sale".to_string();
        parent.end_datetime = 5_000;
        parent.limit_usage_by_group = true;
        parent.group_ids = vec![3];
        store.insert(parent).unwrap();

        assert_eq!(store.update_children(1).unwrap(), 2);
        for child in store.children_of(1) {
            assert_eq!(child.name, "Summer sale");
            assert_eq!(child.end_datetime, 5_000);
            assert!(child.limit_usage_by_group);
            assert_eq!(child.group_ids, vec![3]);
        }
    }

    #[test]
    fn test_record_usage_and_discount_credit_parent() {
        let store = make_store();
        store.create_children(1, 0, &["CHILD".to_string()]).unwrap();
        let child_id = store.get_by_code("CHILD").unwrap().id;

        let customer = Customer::authenticated(9, vec![]);
        store.record_usage(child_id, 100, &customer, "Complete").unwrap();
        store.record_discount(child_id, Decimal::from(5)).unwrap();

        let parent = store.get(1).unwrap();
        let child = store.get(child_id).unwrap();
        assert_eq!(parent.num_orders, 1);
        assert_eq!(child.num_orders, 1);
        assert_eq!(parent.applications[0].user_id, Some(9));
        assert_eq!(parent.total_discount, Decimal::from(5));
        assert_eq!(child.total_discount, Decimal::from(5));
    }

    #[test]
    fn test_anonymous_usage_has_no_user() {
        let store = make_store();
        store
            .record_usage(1, 100, &Customer::anonymous(), "Complete")
            .unwrap();
        assert_eq!(store.get(1).unwrap().applications[0].user_id, None);
        assert_eq!(
            store.record_usage(404, 1, &Customer::anonymous(), "Complete").unwrap_err().code,
            ErrorCode::VoucherNotFound
        );
    }

    #[test]
    fn test_parent_with_children_is_unavailable() {
        let store = make_store();
        let parent = store.get(1).unwrap();
        assert!(store.is_available_to_user(&parent, None, &[]).0);

        store.create_children(1, 1, &[]).unwrap();
        let (available, message) = store.is_available_to_user(&parent, None, &[]);
        assert!(!available);
        assert_eq!(message, "This voucher is not available");

        let child = store.children_of(1).remove(0);
        assert!(store.is_available_to_user(&child, None, &[]).0);
    }
}
