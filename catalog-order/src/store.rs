//! Remote order store
//!
//! The durable side of a reorderable list. The HTTP implementation lives in
//! `catalog-client`; [`InMemoryOrderStore`] backs tests and demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::OrderAssignment;

use crate::error::PersistenceError;

/// Remote order store interface
#[async_trait]
pub trait RemoteOrderStore: Send + Sync {
    /// Persist a full dense ranking. All-or-nothing.
    async fn set_order(&self, assignments: &[OrderAssignment]) -> Result<(), PersistenceError>;

    /// Persist the new 1-based position of a single moved item
    async fn set_item_order(&self, id: &str, order: u32) -> Result<(), PersistenceError>;
}

#[async_trait]
impl<S: RemoteOrderStore + ?Sized> RemoteOrderStore for Arc<S> {
    async fn set_order(&self, assignments: &[OrderAssignment]) -> Result<(), PersistenceError> {
        (**self).set_order(assignments).await
    }

    async fn set_item_order(&self, id: &str, order: u32) -> Result<(), PersistenceError> {
        (**self).set_item_order(id, order).await
    }
}

/// In-memory order store
///
/// Keeps `id -> sort_order` and validates batches the way the backend does.
/// Failures can be injected with [`InMemoryOrderStore::fail_with`].
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<String, u32>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing ranking
    pub fn with_order(assignments: &[OrderAssignment]) -> Self {
        let store = Self::new();
        if let Ok(mut orders) = store.orders.lock() {
            orders.extend(assignments.iter().map(|a| (a.id.clone(), a.order)));
        }
        store
    }

    /// Fail every following call with `message` until [`Self::recover`]
    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(message.into());
        }
    }

    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    /// Number of remote calls received, successful or not
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn order_of(&self, id: &str) -> Option<u32> {
        self.orders.lock().ok()?.get(id).copied()
    }

    /// Stored ids sorted by rank
    pub fn ranked_ids(&self) -> Vec<String> {
        let Ok(orders) = self.orders.lock() else {
            return Vec::new();
        };
        let mut ranked: Vec<_> = orders.iter().collect();
        ranked.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        ranked.into_iter().map(|(id, _)| id.clone()).collect()
    }

    fn begin_call(&self) -> Result<(), PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .failure
            .lock()
            .map_err(|_| PersistenceError::new("order store lock poisoned"))?;
        match failure.as_ref() {
            Some(message) => Err(PersistenceError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteOrderStore for InMemoryOrderStore {
    async fn set_order(&self, assignments: &[OrderAssignment]) -> Result<(), PersistenceError> {
        self.begin_call()?;
        OrderAssignment::validate_dense(assignments)?;

        let mut orders = self
            .orders
            .lock()
            .map_err(|_| PersistenceError::new("order store lock poisoned"))?;
        for assignment in assignments {
            orders.insert(assignment.id.clone(), assignment.order);
        }
        tracing::debug!(count = assignments.len(), "In-memory order stored");
        Ok(())
    }

    async fn set_item_order(&self, id: &str, order: u32) -> Result<(), PersistenceError> {
        self.begin_call()?;
        if order == 0 {
            return Err(PersistenceError::new(format!(
                "sort order for {} must be 1-based",
                id
            )));
        }

        let mut orders = self
            .orders
            .lock()
            .map_err(|_| PersistenceError::new("order store lock poisoned"))?;

        // Shift the others the way a position update does server-side
        let current = orders.get(id).copied();
        for (other_id, other_order) in orders.iter_mut() {
            if other_id == id {
                continue;
            }
            match current {
                Some(from) if from < order && *other_order > from && *other_order <= order => {
                    *other_order -= 1;
                }
                Some(from) if from > order && *other_order >= order && *other_order < from => {
                    *other_order += 1;
                }
                _ => {}
            }
        }
        orders.insert(id.to_string(), order);
        Ok(())
    }
}
