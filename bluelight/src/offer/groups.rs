//! Offer groups
//!
//! Offers are applied group by group in descending group priority. Offers
//! without a group form an implicit group applied last. System groups are
//! created by code on first use and looked up by slug.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{OfferGroup, slugify};

use super::catalog::PreparedOffer;
use crate::pricing::PricingNamespace;

/// Priority given to the first system group when no group exists yet
const FIRST_SYSTEM_GROUP_PRIORITY: i32 = 1000;

/// Split offers into runs of equal group priority, highest first
///
/// Inside a run offers are sorted by priority, highest first. Ungrouped
/// offers share a priority one below the lowest grouped offer (or -1).
pub fn group_offers(offers: Vec<PreparedOffer>) -> Vec<(i32, Vec<PreparedOffer>)> {
    let null_group_priority = offers
        .iter()
        .filter_map(PreparedOffer::group_priority)
        .min()
        .unwrap_or(0)
        - 1;
    let priority_of = |offer: &PreparedOffer| offer.group_priority().unwrap_or(null_group_priority);

    let mut offers = offers;
    offers.sort_by(|a, b| {
        priority_of(b)
            .cmp(&priority_of(a))
            .then_with(|| b.offer.priority.cmp(&a.offer.priority))
    });

    let mut groups: Vec<(i32, Vec<PreparedOffer>)> = Vec::new();
    for offer in offers {
        let priority = priority_of(&offer);
        match groups.last_mut() {
            Some((last, members)) if *last == priority => members.push(offer),
            _ => groups.push((priority, vec![offer])),
        }
    }
    groups
}

/// Handle returned by [`OfferGroupRegistry::register_system_offer_group`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemGroupRef {
    slug: String,
    default_name: Option<String>,
}

impl SystemGroupRef {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Get or create the group
    pub fn resolve(&self, registry: &OfferGroupRegistry) -> AppResult<OfferGroup> {
        registry.insupd_system_offer_group(&self.slug, self.default_name.as_deref())
    }
}

/// In-memory offer group store
#[derive(Clone, Default)]
pub struct OfferGroupRegistry {
    groups: Arc<RwLock<HashMap<i64, OfferGroup>>>,
    /// System groups registered but not created yet
    pending: Arc<Mutex<Vec<SystemGroupRef>>>,
    /// Bumped whenever a group is written
    pricing_namespace: PricingNamespace,
}

impl std::fmt::Debug for OfferGroupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfferGroupRegistry")
            .field("groups_count", &self.groups.read().len())
            .field("pending_count", &self.pending.lock().len())
            .finish()
    }
}

impl OfferGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pricing_namespace(pricing_namespace: PricingNamespace) -> Self {
        Self {
            pricing_namespace,
            ..Self::default()
        }
    }

    /// Insert or replace a group; priorities are unique
    pub fn insert(&self, mut group: OfferGroup) -> AppResult<OfferGroup> {
        let mut groups = self.groups.write();
        if let Some(other) = groups
            .values()
            .find(|g| g.id != group.id && g.priority == group.priority)
        {
            return Err(AppError::with_message(
                ErrorCode::DuplicateGroupPriority,
                format!("Offer group priority {} is already in use", group.priority),
            )
            .with_detail("group_id", other.id));
        }
        if group.slug.is_empty() {
            group.slug = slugify(&group.name);
        }
        groups.insert(group.id, group.clone());
        self.pricing_namespace.bump();
        Ok(group)
    }

    pub fn get(&self, id: i64) -> Option<OfferGroup> {
        self.groups.read().get(&id).cloned()
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<OfferGroup> {
        self.groups.read().values().find(|g| g.slug == slug).cloned()
    }

    /// Every group, highest priority first
    pub fn all(&self) -> Vec<OfferGroup> {
        let mut groups: Vec<OfferGroup> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| b.priority.cmp(&a.priority));
        groups
    }

    /// Get or create the system group `slug`
    ///
    /// A new group is named `default_name` (or the slug) and placed above
    /// every existing group.
    pub fn insupd_system_offer_group(
        &self,
        slug: &str,
        default_name: Option<&str>,
    ) -> AppResult<OfferGroup> {
        let mut groups = self.groups.write();
        if let Some(existing) = groups.values().find(|g| g.slug == slug) {
            if !existing.is_system_group {
                return Err(AppError::already_exists(format!("Offer group {}", slug)));
            }
            return Ok(existing.clone());
        }

        let priority = match groups.values().map(|g| g.priority).max() {
            Some(max) if max != 0 => max + 1,
            _ => FIRST_SYSTEM_GROUP_PRIORITY,
        };
        let id = groups.keys().max().copied().unwrap_or(0) + 1;
        let group = OfferGroup {
            id,
            name: default_name.unwrap_or(slug).to_string(),
            slug: slug.to_string(),
            priority,
            is_system_group: true,
        };
        groups.insert(id, group.clone());
        self.pricing_namespace.bump();
        tracing::info!(
            slug = %group.slug,
            priority = group.priority,
            "Created system offer group"
        );
        Ok(group)
    }

    /// Register a system group to be created on first use
    pub fn register_system_offer_group(
        &self,
        slug: impl Into<String>,
        default_name: Option<&str>,
    ) -> SystemGroupRef {
        let group = SystemGroupRef {
            slug: slug.into(),
            default_name: default_name.map(str::to_string),
        };
        self.pending.lock().push(group.clone());
        group
    }

    /// Create every registered system group that does not exist yet
    pub fn ensure_all_system_groups_exist(&self) -> AppResult<()> {
        let pending: Vec<SystemGroupRef> = std::mem::take(&mut *self.pending.lock());
        for group in pending {
            group.resolve(self)?;
        }
        Ok(())
    }
}
