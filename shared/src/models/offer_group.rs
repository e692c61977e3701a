//! Offer Group Model

use serde::{Deserialize, Serialize};

/// Offer group entity
///
/// Groups are applied in descending priority order. Offers inside one group
/// compete for the same basket items; later groups see the basket afresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfferGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub priority: i32,
    /// System groups are created by code and can't be removed by merchants
    #[serde(default)]
    pub is_system_group: bool,
}

impl OfferGroup {
    pub fn new(id: i64, name: impl Into<String>, priority: i32) -> Self {
        let name = name.into();
        Self {
            id,
            slug: slugify(&name),
            name,
            priority,
            is_system_group: false,
        }
    }
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
