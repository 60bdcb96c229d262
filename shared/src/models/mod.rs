//! Data models
//!
//! Shared between the ordering core and the admin client (via API).
//! Every list the dashboard can reorder implements [`Orderable`].

pub mod category;
pub mod product;
pub mod slider;
pub mod sort_order;

// Re-exports
pub use category::*;
pub use product::*;
pub use slider::*;
pub use sort_order::*;

/// An entity that lives in a user-ordered list.
pub trait Orderable {
    /// Stable identity, unique within one list.
    fn order_key(&self) -> String;

    /// Durable rank as last returned by the backend (1-based).
    fn sort_order(&self) -> i32;
}

/// Sort a freshly loaded list into display order.
///
/// Ties on `sort_order` (legacy rows are often all `0`) fall back to the key
/// so the result is deterministic.
pub fn sort_by_order<T: Orderable>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.sort_order()
            .cmp(&b.sort_order())
            .then_with(|| a.order_key().cmp(&b.order_key()))
    });
}
