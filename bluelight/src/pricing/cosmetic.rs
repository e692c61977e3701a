//! Cosmetic price cache
//!
//! Cosmetic prices are the per-unit discounts site offers would give a
//! product if it were the only thing in a basket. They are expensive to
//! compute, so results are kept for a configurable TTL under a namespace
//! version. Bumping the version invalidates every entry at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rust_decimal::Decimal;
use shared::error::AppResult;

/// Version counter shared by the catalog and the cosmetic price cache
///
/// Every catalog write bumps it. Entries stored under an older version are
/// never returned.
#[derive(Debug, Clone, Default)]
pub struct PricingNamespace(Arc<AtomicU64>);

impl PricingNamespace {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Returns the new version
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Everything a cosmetic price depends on besides the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CosmeticPriceKey {
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price_excl_tax: Decimal,
    pub unit_tax: Option<Decimal>,
}

#[derive(Debug)]
pub struct CosmeticPriceCache {
    entries: DashMap<(CosmeticPriceKey, u64), (Decimal, Instant)>,
    namespace: PricingNamespace,
    /// Namespace version the entries were last pruned at
    pruned_version: AtomicU64,
    ttl: Duration,
}

impl CosmeticPriceCache {
    /// Cache with a namespace of its own
    pub fn new(ttl: Duration) -> Self {
        Self::with_namespace(ttl, PricingNamespace::default())
    }

    pub fn with_namespace(ttl: Duration, namespace: PricingNamespace) -> Self {
        let pruned_version = AtomicU64::new(namespace.current());
        Self {
            entries: DashMap::new(),
            namespace,
            pruned_version,
            ttl,
        }
    }

    pub fn version(&self) -> u64 {
        self.namespace.current()
    }

    /// Cached price, if present and not expired
    pub fn get(&self, key: &CosmeticPriceKey) -> Option<Decimal> {
        self.get_at(key, self.version())
    }

    pub fn insert(&self, key: CosmeticPriceKey, price: Decimal) {
        self.insert_at(key, self.version(), price);
    }

    /// Cached price, computing and storing it on a miss
    ///
    /// The price is stored under the version read before computing, so a
    /// concurrent invalidation makes it unreachable.
    pub fn get_or_try_insert_with<F>(&self, key: CosmeticPriceKey, compute: F) -> AppResult<Decimal>
    where
        F: FnOnce() -> AppResult<Decimal>,
    {
        let version = self.version();
        if let Some(price) = self.get_at(&key, version) {
            tracing::trace!(product_id = key.product_id, quantity = key.quantity, "Cosmetic price cache hit");
            return Ok(price);
        }
        let price = compute()?;
        self.insert_at(key, version, price);
        Ok(price)
    }

    /// Invalidate every cached price
    ///
    /// Returns the new namespace version.
    pub fn invalidate(&self) -> u64 {
        let version = self.namespace.bump();
        self.prune_stale();
        tracing::debug!(version, "Cosmetic price cache invalidated");
        version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&self, key: &CosmeticPriceKey, version: u64) -> Option<Decimal> {
        let entry_key = (*key, version);
        let entry = self.entries.get(&entry_key)?;
        let (price, stored_at) = *entry;
        if stored_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(&entry_key);
            return None;
        }
        Some(price)
    }

    fn insert_at(&self, key: CosmeticPriceKey, version: u64, price: Decimal) {
        self.prune_stale();
        if version == self.version() {
            self.entries.insert((key, version), (price, Instant::now()));
        }
    }

    /// Drop entries of older versions once per version change
    fn prune_stale(&self) {
        let current = self.version();
        if self.pruned_version.swap(current, Ordering::AcqRel) != current {
            self.entries.retain(|(_, version), _| *version == current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::{AppError, ErrorCode};

    fn key(product_id: i64, quantity: u32, price: i64) -> CosmeticPriceKey {
        CosmeticPriceKey {
            product_id,
            quantity,
            unit_price_excl_tax: Decimal::from(price),
            unit_tax: None,
        }
    }

    fn make_cache() -> CosmeticPriceCache {
        CosmeticPriceCache::new(Duration::from_secs(60))
    }

    #[test]
    fn test_get_or_try_insert_with_computes_once() {
        let cache = make_cache();
        let mut calls = 0;
        let first = cache
            .get_or_try_insert_with(key(1, 1, 20), || {
                calls += 1;
                Ok(Decimal::from(-2))
            })
            .unwrap();
        let second = cache
            .get_or_try_insert_with(key(1, 1, 20), || Ok(Decimal::from(99)))
            .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(first, Decimal::from(-2));
        assert_eq!(second, Decimal::from(-2));
        // Quantity is part of the key
        assert_eq!(cache.get(&key(1, 2, 20)), None);
    }

    #[test]
    fn test_unit_price_is_part_of_the_key() {
        let cache = make_cache();
        cache.insert(key(1, 1, 20), Decimal::from(18));
        assert_eq!(cache.get(&key(1, 1, 100)), None);

        let price = cache
            .get_or_try_insert_with(key(1, 1, 100), || Ok(Decimal::from(90)))
            .unwrap();
        assert_eq!(price, Decimal::from(90));
        assert_eq!(cache.get(&key(1, 1, 20)), Some(Decimal::from(18)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = make_cache();
        let result = cache.get_or_try_insert_with(key(1, 1, 20), || {
            Err(AppError::new(ErrorCode::ProductNotFound))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_bumps_version() {
        let cache = make_cache();
        cache.insert(key(1, 1, 20), Decimal::ONE);
        let before = cache.version();
        assert_eq!(cache.invalidate(), before + 1);
        assert_eq!(cache.get(&key(1, 1, 20)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_namespace_bump_hides_entries() {
        let namespace = PricingNamespace::default();
        let cache = CosmeticPriceCache::with_namespace(Duration::from_secs(60), namespace.clone());
        cache.insert(key(1, 1, 20), Decimal::ONE);

        namespace.bump();
        assert_eq!(cache.get(&key(1, 1, 20)), None);

        // Stale entries are pruned on the next insert
        cache.insert(key(2, 1, 20), Decimal::ONE);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_price_computed_across_an_invalidation_is_dropped() {
        let cache = make_cache();
        let price = cache
            .get_or_try_insert_with(key(1, 1, 20), || {
                cache.invalidate();
                Ok(Decimal::from(18))
            })
            .unwrap();
        assert_eq!(price, Decimal::from(18));
        assert_eq!(cache.get(&key(1, 1, 20)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = CosmeticPriceCache::new(Duration::ZERO);
        cache.insert(key(1, 1, 20), Decimal::ONE);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&key(1, 1, 20)), None);
        assert!(cache.is_empty());
    }
}
