//! Offers: conditions, benefits, proxy resolution and application

pub mod applicator;
pub mod benefits;
pub mod catalog;
pub mod conditions;
pub mod groups;
pub mod hooks;
pub mod proxy;
pub mod results;
pub mod upsells;

pub use applicator::Applicator;
pub use benefits::{Benefit, BenefitBehavior};
pub use catalog::{OfferCatalog, PreparedOffer};
pub use conditions::{Condition, ConditionBehavior};
pub use groups::{OfferGroupRegistry, SystemGroupRef, group_offers};
pub use hooks::{ApplicatorHooks, SystemGroupHook};
pub use proxy::{BenefitProxy, CatalogLookup, ConditionProxy};
pub use results::{ApplicationResult, OfferApplications};
pub use upsells::OfferUpsell;
