//! Homepage Slider Model

use serde::{Deserialize, Serialize};

use super::Orderable;

/// Homepage carousel slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slider {
    pub id: String,
    pub title: String,
    pub image: String,
    /// Click-through target, if any
    #[serde(default)]
    pub link: Option<String>,
    /// Rank in the carousel. The backend calls this `sort_order` on the wire.
    #[serde(rename = "sort_order")]
    pub display_order: i32,
    pub is_active: bool,
}

impl Orderable for Slider {
    fn order_key(&self) -> String {
        self.id.clone()
    }

    fn sort_order(&self) -> i32 {
        self.display_order
    }
}
