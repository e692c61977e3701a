//! Pricing helpers built on top of offer application

pub mod cosmetic;

pub use cosmetic::{CosmeticPriceCache, CosmeticPriceKey, PricingNamespace};
