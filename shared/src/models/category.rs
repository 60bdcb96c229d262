//! Category Model

use serde::{Deserialize, Serialize};

use super::Orderable;

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
    /// Whether this category is visible in the storefront menu
    #[serde(default = "default_true")]
    pub is_display: bool,
}

fn default_true() -> bool {
    true
}

impl Orderable for Category {
    fn order_key(&self) -> String {
        self.id.clone()
    }

    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}
