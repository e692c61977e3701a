//! Product Range Model

use serde::{Deserialize, Serialize};

use super::product::Product;

/// A named selection of products that conditions and benefits operate on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRange {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub includes_all_products: bool,
    #[serde(default)]
    pub included_product_ids: Vec<i64>,
    #[serde(default)]
    pub excluded_product_ids: Vec<i64>,
    #[serde(default)]
    pub included_category_ids: Vec<i64>,
}

impl ProductRange {
    /// Range that matches every product
    pub fn all_products(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            includes_all_products: true,
            included_product_ids: Vec::new(),
            excluded_product_ids: Vec::new(),
            included_category_ids: Vec::new(),
        }
    }

    /// Range that matches an explicit product list
    pub fn of_products(id: i64, name: impl Into<String>, product_ids: Vec<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            includes_all_products: false,
            included_product_ids: product_ids,
            excluded_product_ids: Vec::new(),
            included_category_ids: Vec::new(),
        }
    }

    /// Exclusions win over every inclusion rule
    pub fn contains_product(&self, product: &Product) -> bool {
        if self.excluded_product_ids.contains(&product.id) {
            return false;
        }
        if self.includes_all_products {
            return true;
        }
        if self.included_product_ids.contains(&product.id) {
            return true;
        }
        product
            .category_ids
            .iter()
            .any(|c| self.included_category_ids.contains(c))
    }
}
