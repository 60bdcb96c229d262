//! Catalog Order - reorderable lists with optimistic persistence
//!
//! [`OrderController`] holds a list in display order and applies moves.
//! [`OptimisticOrderPersistence`] wraps it, commits every move to a
//! [`RemoteOrderStore`] and reverts to the last confirmed order when the
//! commit fails.

pub mod controller;
pub mod error;
pub mod notifier;
pub mod persistence;
pub mod store;

pub use controller::{DragHandle, OrderController, PendingReorder};
pub use error::{OrderError, OrderResult, PersistenceError};
pub use notifier::{ChannelNotifier, Notifier, TracingNotifier};
pub use persistence::{CommitMode, CommitOutcome, OptimisticOrderPersistence, SyncState};
pub use store::{InMemoryOrderStore, RemoteOrderStore};

// Re-export shared types for convenience
pub use shared::{NotificationLevel, NotificationPayload, OrderAssignment, Orderable};
