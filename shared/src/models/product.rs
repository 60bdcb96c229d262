//! Product Model

use serde::{Deserialize, Serialize};

use super::Orderable;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Category reference (String ID, required)
    pub category: String,
    pub sort_order: i32,
    /// Price in cents
    pub price: i64,
    pub stock: i32,
    pub is_active: bool,
}

impl Orderable for Product {
    fn order_key(&self) -> String {
        self.id.clone()
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

/// Featured product entry (homepage curation)
///
/// References a product; the entry has its own rank independent of the
/// product's position inside its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedProduct {
    pub id: String,
    /// Product reference (String ID)
    pub product: String,
    pub name: String,
    pub image: String,
    pub sort_order: i32,
}

impl Orderable for FeaturedProduct {
    fn order_key(&self) -> String {
        self.id.clone()
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}
