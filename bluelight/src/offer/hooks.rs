//! Applicator hooks
//!
//! Callbacks fired around offer application. Every method defaults to a
//! no-op so implementors only override the events they care about.

use shared::models::OfferGroup;

use super::catalog::PreparedOffer;
use super::groups::OfferGroupRegistry;
use crate::basket::Basket;

pub trait ApplicatorHooks: Send + Sync {
    fn pre_offers_apply(&self, _basket: &mut Basket, _offers: &[PreparedOffer]) {}

    fn pre_offer_group_apply(
        &self,
        _basket: &mut Basket,
        _group: Option<&OfferGroup>,
        _offers: &[PreparedOffer],
    ) {
    }

    fn post_offer_group_apply(
        &self,
        _basket: &mut Basket,
        _group: Option<&OfferGroup>,
        _offers: &[PreparedOffer],
    ) {
    }

    fn post_offers_apply(&self, _basket: &mut Basket, _offers: &[PreparedOffer]) {}
}

/// Forwards group events to `inner` only for the system group `slug`
pub struct SystemGroupHook<H> {
    slug: String,
    registry: OfferGroupRegistry,
    inner: H,
}

impl<H: ApplicatorHooks> SystemGroupHook<H> {
    pub fn new(slug: impl Into<String>, registry: OfferGroupRegistry, inner: H) -> Self {
        Self {
            slug: slug.into(),
            registry,
            inner,
        }
    }

    fn is_target(&self, group: Option<&OfferGroup>) -> bool {
        if let Err(e) = self.registry.ensure_all_system_groups_exist() {
            tracing::error!(error = %e, "Failed to create system offer groups");
        }
        let Some(target) = self.registry.get_by_slug(&self.slug) else {
            tracing::error!(
                slug = %self.slug,
                "Listener is attached to an offer group that does not exist"
            );
            return false;
        };
        if !target.is_system_group {
            tracing::warn!(
                slug = %self.slug,
                "Listeners should only be attached to system offer groups"
            );
        }
        group.is_some_and(|g| g.id == target.id)
    }
}

impl<H: ApplicatorHooks> ApplicatorHooks for SystemGroupHook<H> {
    fn pre_offer_group_apply(
        &self,
        basket: &mut Basket,
        group: Option<&OfferGroup>,
        offers: &[PreparedOffer],
    ) {
        if self.is_target(group) {
            self.inner.pre_offer_group_apply(basket, group, offers);
        }
    }

    fn post_offer_group_apply(
        &self,
        basket: &mut Basket,
        group: Option<&OfferGroup>,
        offers: &[PreparedOffer],
    ) {
        if self.is_target(group) {
            self.inner.post_offer_group_apply(basket, group, offers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl ApplicatorHooks for Recorder {
        fn pre_offer_group_apply(
            &self,
            _basket: &mut Basket,
            group: Option<&OfferGroup>,
            _offers: &[PreparedOffer],
        ) {
            let name = group.map(|g| g.slug.clone()).unwrap_or_default();
            self.events.lock().push(format!("pre:{}", name));
        }
    }

    #[test]
    fn test_system_group_hook_filters_groups() {
        let registry = OfferGroupRegistry::new();
        registry.register_system_offer_group("staff", Some("Staff"));
        let recorder = Recorder::default();
        let hook = SystemGroupHook::new("staff", registry.clone(), recorder.clone());
        let mut basket = Basket::new("USD");

        hook.pre_offer_group_apply(&mut basket, None, &[]);
        let staff = registry.get_by_slug("staff").unwrap();
        let other = OfferGroup::new(99, "Other", 1);
        hook.pre_offer_group_apply(&mut basket, Some(&other), &[]);
        hook.pre_offer_group_apply(&mut basket, Some(&staff), &[]);

        assert_eq!(*recorder.events.lock(), vec!["pre:staff".to_string()]);
    }

    #[test]
    fn test_missing_group_never_fires() {
        let registry = OfferGroupRegistry::new();
        let recorder = Recorder::default();
        let hook = SystemGroupHook::new("ghost", registry, recorder.clone());
        let mut basket = Basket::new("USD");
        let group = OfferGroup::new(1, "Ghost", 1);
        hook.pre_offer_group_apply(&mut basket, Some(&group), &[]);
        assert!(recorder.events.lock().is_empty());
    }
}
