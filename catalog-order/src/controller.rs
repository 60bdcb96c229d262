//! Order Controller
//!
//! Holds a list in display order and applies array-move operations.
//! Also tracks the drag gesture that produces a [`PendingReorder`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use shared::{OrderAssignment, Orderable};

use crate::error::{OrderError, OrderResult};

/// Identity projection supplied by the caller
pub type IdFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Observer invoked with the new sequence after every effective move
pub type OrderObserver<T> = Box<dyn Fn(&[T]) + Send + Sync>;

/// A completed move gesture, consumed immediately by [`OrderController::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReorder {
    pub source: usize,
    pub destination: usize,
}

impl PendingReorder {
    pub fn new(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// Properties handed to the render callback for each row's drag handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragHandle {
    pub item_id: String,
    pub index: usize,
}

/// In-progress drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragState {
    source: usize,
    over: Option<usize>,
}

pub struct OrderController<T> {
    items: Vec<T>,
    get_id: IdFn<T>,
    observers: Vec<OrderObserver<T>>,
    drag: Option<DragState>,
}

impl<T> OrderController<T> {
    /// Create an empty controller with an explicit identity projection
    pub fn new<F>(get_id: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            items: Vec::new(),
            get_id: Arc::new(get_id),
            observers: Vec::new(),
            drag: None,
        }
    }

    /// Create an empty controller keyed by [`Orderable::order_key`]
    pub fn keyed() -> Self
    where
        T: Orderable,
    {
        Self::new(|item: &T| item.order_key())
    }

    /// Replace the list wholesale.
    ///
    /// Rejects duplicate ids and keeps the previous list in that case.
    /// Any in-progress drag gesture is discarded either way.
    pub fn initialize(&mut self, items: Vec<T>) -> OrderResult<()> {
        self.drag = None;

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            let id = (self.get_id)(item);
            if !seen.insert(id.clone()) {
                return Err(OrderError::InvalidState(format!("duplicate id: {}", id)));
            }
        }

        tracing::debug!(count = items.len(), "Order list initialized");
        self.items = items;
        Ok(())
    }

    /// Register an observer for effective moves
    pub fn on_order_change<F>(&mut self, observer: F)
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn id_of(&self, item: &T) -> String {
        (self.get_id)(item)
    }

    /// Ids in display order
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|item| (self.get_id)(item)).collect()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| (self.get_id)(item) == id)
    }

    /// Dense `1..=N` assignments for the current order
    pub fn assignments(&self) -> Vec<OrderAssignment> {
        OrderAssignment::dense(self.ids())
    }

    /// Move the element at `source` to `destination`, shifting the
    /// elements in between by one. Returns the new sequence.
    pub fn move_item(&mut self, source: usize, destination: usize) -> OrderResult<&[T]> {
        self.apply(PendingReorder::new(source, destination))?;
        Ok(&self.items)
    }

    /// Apply a reorder. Returns `false` for a no-op (same index, or a list
    /// shorter than two elements), in which case observers are not called.
    pub fn apply(&mut self, reorder: PendingReorder) -> OrderResult<bool> {
        let len = self.items.len();
        if len < 2 {
            return Ok(false);
        }
        for index in [reorder.source, reorder.destination] {
            if index >= len {
                return Err(OrderError::InvalidIndex { index, len });
            }
        }
        if reorder.source == reorder.destination {
            return Ok(false);
        }

        let item = self.items.remove(reorder.source);
        self.items.insert(reorder.destination, item);

        tracing::debug!(
            source = reorder.source,
            destination = reorder.destination,
            "Item moved"
        );
        self.notify_observers();
        Ok(true)
    }

    /// Replace the list with a known-good order (revert path).
    ///
    /// Observers are told because the visible order changes.
    pub(crate) fn restore(&mut self, items: Vec<T>) {
        self.drag = None;
        self.items = items;
        self.notify_observers();
    }

    fn notify_observers(&self) {
        for observer in &self.observers {
            observer(&self.items);
        }
    }

    // ========== Drag Gesture ==========

    /// Start dragging the row at `index`
    pub fn begin_drag(&mut self, index: usize) -> OrderResult<()> {
        if index >= self.items.len() {
            return Err(OrderError::InvalidIndex {
                index,
                len: self.items.len(),
            });
        }
        self.drag = Some(DragState {
            source: index,
            over: None,
        });
        Ok(())
    }

    /// Pointer is over the row at `index`. Ignored when no drag is active.
    pub fn drag_over(&mut self, index: usize) -> OrderResult<()> {
        if index >= self.items.len() {
            return Err(OrderError::InvalidIndex {
                index,
                len: self.items.len(),
            });
        }
        if let Some(drag) = self.drag.as_mut() {
            drag.over = Some(index);
        }
        Ok(())
    }

    /// Finish the gesture. Dropping without hovering a row yields a
    /// same-index reorder (a no-op once applied).
    pub fn end_drag(&mut self) -> Option<PendingReorder> {
        self.drag
            .take()
            .map(|drag| PendingReorder::new(drag.source, drag.over.unwrap_or(drag.source)))
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Index of the row being dragged, if any
    pub fn dragging(&self) -> Option<usize> {
        self.drag.map(|drag| drag.source)
    }

    /// Invoke `f(item, index, handle, is_dragging)` for each row in order
    pub fn render<R, F>(&self, mut f: F) -> Vec<R>
    where
        F: FnMut(&T, usize, &DragHandle, bool) -> R,
    {
        let dragging = self.dragging();
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let handle = DragHandle {
                    item_id: (self.get_id)(item),
                    index,
                };
                f(item, index, &handle, dragging == Some(index))
            })
            .collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderController")
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .field("drag", &self.drag)
            .finish()
    }
}
