//! Optimistic Order Persistence
//!
//! Applies moves locally right away, then commits them to a
//! [`RemoteOrderStore`]. A failed commit restores the last confirmed order
//! (the baseline) and is reported through the [`Notifier`].
//!
//! Commits are serialized per list: they pass through a FIFO gate one at a
//! time while local moves keep applying. In [`CommitMode::Batch`] a queued
//! commit that a newer move has overtaken is skipped, since the newer
//! commit carries the full order. A revert or re-initialization
//! invalidates everything still queued.
//!
//! Order observers registered through [`OptimisticOrderPersistence::on_order_change`]
//! run while the list is locked and must not call back into it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::{NotificationPayload, OrderAssignment, Orderable};

use crate::controller::{DragHandle, OrderController, PendingReorder};
use crate::error::{OrderResult, PersistenceError};
use crate::notifier::Notifier;
use crate::store::RemoteOrderStore;

/// Which remote call a move is committed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// Send the full dense ranking (`set_order`)
    #[default]
    Batch,
    /// Send only the moved item and its new position (`set_item_order`)
    SingleItem,
}

/// Sync state of one list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Local order equals the last confirmed remote order
    Synced,
    /// At least one commit is queued or in flight
    PendingCommit,
    /// A commit failed or was abandoned; the baseline has been restored
    /// and the failure is being reported to the notifier
    Reverting,
}

/// Result of one move/commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The move was a no-op; nothing was sent
    Unchanged,
    /// The remote store confirmed the order; it is the new baseline
    Committed,
    /// Skipped because a newer move will commit the full order
    Superseded,
    /// Skipped because the list was reverted or re-initialized meanwhile
    Discarded,
    /// The remote store rejected the order; local state was reverted
    Reverted(PersistenceError),
}

#[derive(Debug)]
struct ListState<T> {
    controller: OrderController<T>,
    baseline: Vec<T>,
    sync: SyncState,
    /// Bumped on every locally applied change
    generation: u64,
    /// Bumped on revert and re-initialization
    epoch: u64,
    /// Commits queued or in flight
    pending: usize,
}

/// A locally applied change waiting for its turn at the commit gate
struct Ticket<T> {
    generation: u64,
    epoch: u64,
    snapshot: Vec<T>,
    /// Moved item and its 1-based position, for single-item commits
    item: Option<(String, u32)>,
}

enum CommitRequest {
    Batch(Vec<OrderAssignment>),
    Item { id: String, order: u32 },
}

pub struct OptimisticOrderPersistence<T, S, N> {
    state: Mutex<ListState<T>>,
    commit_gate: tokio::sync::Mutex<()>,
    store: S,
    notifier: N,
    mode: CommitMode,
    label: String,
}

impl<T, S, N> OptimisticOrderPersistence<T, S, N>
where
    T: Clone + Send + 'static,
    S: RemoteOrderStore,
    N: Notifier,
{
    /// Wrap a controller. Its current items become the baseline.
    pub fn new(controller: OrderController<T>, store: S, notifier: N) -> Self {
        let baseline = controller.items().to_vec();
        Self {
            state: Mutex::new(ListState {
                controller,
                baseline,
                sync: SyncState::Synced,
                generation: 0,
                epoch: 0,
                pending: 0,
            }),
            commit_gate: tokio::sync::Mutex::new(()),
            store,
            notifier,
            mode: CommitMode::Batch,
            label: "list".to_string(),
        }
    }

    /// Build a list of [`Orderable`] items loaded from the remote store
    pub fn keyed(items: Vec<T>, store: S, notifier: N) -> OrderResult<Self>
    where
        T: Orderable,
    {
        let mut controller = OrderController::keyed();
        controller.initialize(items)?;
        Ok(Self::new(controller, store, notifier))
    }

    pub fn with_mode(mut self, mode: CommitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Name used in logs and notifications (e.g. "slider")
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn mode(&self) -> CommitMode {
        self.mode
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Accessors ==========

    pub fn state(&self) -> SyncState {
        self.lock_state().sync
    }

    /// Current local (possibly optimistic) order
    pub fn items(&self) -> Vec<T> {
        self.lock_state().controller.items().to_vec()
    }

    /// Last order confirmed by the remote store
    pub fn baseline(&self) -> Vec<T> {
        self.lock_state().baseline.clone()
    }

    pub fn assignments(&self) -> Vec<OrderAssignment> {
        self.lock_state().controller.assignments()
    }

    pub fn on_order_change<F>(&self, observer: F)
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.lock_state().controller.on_order_change(observer);
    }

    // ========== Upstream Refresh ==========

    /// Replace local order and baseline with a fresh remote load.
    /// Commits still queued are discarded.
    pub fn initialize(&self, items: Vec<T>) -> OrderResult<()> {
        let dropped = {
            let mut state = self.lock_state();
            state.controller.initialize(items.clone())?;
            state.baseline = items;
            state.epoch += 1;
            state.sync = SyncState::Synced;
            state.pending
        };

        if dropped > 0 {
            tracing::warn!(list = %self.label, dropped, "List refreshed with commits pending");
            self.notifier.notify(NotificationPayload::warning(
                "Order refreshed",
                format!("Unsaved {} order changes were replaced by the server order", self.label),
            ));
        }
        Ok(())
    }

    // ========== Moves ==========

    /// Move locally, then commit. Resolves once this move's commit is done.
    pub async fn move_item(&self, source: usize, destination: usize) -> OrderResult<CommitOutcome> {
        self.apply(PendingReorder::new(source, destination)).await
    }

    pub async fn apply(&self, reorder: PendingReorder) -> OrderResult<CommitOutcome> {
        match self.stage(Some(reorder))? {
            Some(ticket) => Ok(self.run_commit(ticket).await),
            None => Ok(CommitOutcome::Unchanged),
        }
    }

    /// Re-send the current full order
    pub async fn commit(&self) -> OrderResult<CommitOutcome> {
        match self.stage(None)? {
            Some(ticket) => Ok(self.run_commit(ticket).await),
            None => Ok(CommitOutcome::Unchanged),
        }
    }

    // ========== Drag Gesture ==========

    pub fn begin_drag(&self, index: usize) -> OrderResult<()> {
        self.lock_state().controller.begin_drag(index)
    }

    pub fn drag_over(&self, index: usize) -> OrderResult<()> {
        self.lock_state().controller.drag_over(index)
    }

    pub fn cancel_drag(&self) {
        self.lock_state().controller.cancel_drag();
    }

    /// Drop the dragged row and commit the resulting move
    pub async fn finish_drag(&self) -> OrderResult<CommitOutcome> {
        let reorder = self.lock_state().controller.end_drag();
        match reorder {
            Some(reorder) => self.apply(reorder).await,
            None => Ok(CommitOutcome::Unchanged),
        }
    }

    pub fn render<R, F>(&self, f: F) -> Vec<R>
    where
        F: FnMut(&T, usize, &DragHandle, bool) -> R,
    {
        self.lock_state().controller.render(f)
    }

    // ========== Commit Pipeline ==========

    /// Apply the change locally and take a ticket for the commit gate.
    /// `None` reorder means "commit the current order as is".
    fn stage(&self, reorder: Option<PendingReorder>) -> OrderResult<Option<Ticket<T>>> {
        let mut state = self.lock_state();

        let item = match reorder {
            Some(reorder) => {
                if !state.controller.apply(reorder)? {
                    return Ok(None);
                }
                match self.mode {
                    CommitMode::Batch => None,
                    CommitMode::SingleItem => {
                        let moved = &state.controller.items()[reorder.destination];
                        let id = state.controller.id_of(moved);
                        Some((id, reorder.destination as u32 + 1))
                    }
                }
            }
            None => None,
        };

        state.generation += 1;
        state.pending += 1;
        state.sync = SyncState::PendingCommit;

        Ok(Some(Ticket {
            generation: state.generation,
            epoch: state.epoch,
            snapshot: state.controller.items().to_vec(),
            item,
        }))
    }

    async fn run_commit(&self, ticket: Ticket<T>) -> CommitOutcome {
        // Created before the first await so a dropped future still settles
        let mut in_flight = InFlight {
            list: self,
            epoch: ticket.epoch,
            settled: false,
        };
        let _gate = self.commit_gate.lock().await;

        let request = {
            let mut state = self.lock_state();
            if state.epoch != ticket.epoch {
                in_flight.settle(&mut state);
                return CommitOutcome::Discarded;
            }
            match &ticket.item {
                Some((id, order)) => CommitRequest::Item {
                    id: id.clone(),
                    order: *order,
                },
                None if state.generation != ticket.generation => {
                    in_flight.settle(&mut state);
                    tracing::debug!(list = %self.label, generation = ticket.generation, "Commit superseded");
                    return CommitOutcome::Superseded;
                }
                // Numbering is recomputed over the full sequence at commit time
                None => CommitRequest::Batch(OrderAssignment::dense(
                    ticket.snapshot.iter().map(|item| state.controller.id_of(item)),
                )),
            }
        };

        let result = match &request {
            CommitRequest::Batch(assignments) => {
                tracing::info!(list = %self.label, count = assignments.len(), "Committing order");
                self.store.set_order(assignments).await
            }
            CommitRequest::Item { id, order } => {
                tracing::info!(list = %self.label, id = %id, order, "Committing item position");
                self.store.set_item_order(id, *order).await
            }
        };

        let mut state = self.lock_state();
        in_flight.settle(&mut state);
        if state.epoch != ticket.epoch {
            return CommitOutcome::Discarded;
        }

        match result {
            Ok(()) => {
                state.baseline = ticket.snapshot;
                if state.pending == 0 {
                    state.sync = SyncState::Synced;
                }
                drop(state);

                tracing::info!(list = %self.label, "Order committed");
                self.notifier.notify(NotificationPayload::info(
                    "Order saved",
                    format!("The {} order was updated", self.label),
                ));
                CommitOutcome::Committed
            }
            Err(err) => {
                Self::revert_locked(&mut state);
                drop(state);

                tracing::warn!(list = %self.label, error = %err, "Commit failed, order reverted");
                self.finish_revert(NotificationPayload::error("Reorder failed", err.message()));
                CommitOutcome::Reverted(err)
            }
        }
    }

    /// Restore the baseline and invalidate every queued commit.
    /// Leaves the list in [`SyncState::Reverting`] until [`Self::finish_revert`].
    fn revert_locked(state: &mut ListState<T>) {
        let baseline = state.baseline.clone();
        state.controller.restore(baseline);
        state.epoch += 1;
        state.sync = SyncState::Reverting;
    }

    /// Report the revert, then leave [`SyncState::Reverting`]
    fn finish_revert(&self, payload: NotificationPayload) {
        self.notifier.notify(payload);

        let mut state = self.lock_state();
        // A move staged meanwhile already moved the list to PendingCommit
        if state.sync == SyncState::Reverting {
            state.sync = SyncState::Synced;
        }
    }
}

/// Pending-slot bookkeeping for one commit.
///
/// Dropped without [`InFlight::settle`] means the caller abandoned the
/// commit (timeout, `select!`, dropped task). The optimistic order was never
/// confirmed, so it is reverted like a failed commit.
struct InFlight<'a, T, S, N>
where
    T: Clone + Send + 'static,
    S: RemoteOrderStore,
    N: Notifier,
{
    list: &'a OptimisticOrderPersistence<T, S, N>,
    epoch: u64,
    settled: bool,
}

impl<T, S, N> InFlight<'_, T, S, N>
where
    T: Clone + Send + 'static,
    S: RemoteOrderStore,
    N: Notifier,
{
    fn settle(&mut self, state: &mut ListState<T>) {
        state.pending -= 1;
        self.settled = true;
    }
}

impl<T, S, N> Drop for InFlight<'_, T, S, N>
where
    T: Clone + Send + 'static,
    S: RemoteOrderStore,
    N: Notifier,
{
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let reverted = {
            let mut state = self.list.lock_state();
            state.pending -= 1;
            let current = state.epoch == self.epoch;
            if current {
                OptimisticOrderPersistence::<T, S, N>::revert_locked(&mut state);
            }
            current
        };

        if reverted {
            tracing::warn!(list = %self.list.label, "Commit abandoned, order reverted");
            self.list.finish_revert(NotificationPayload::warning(
                "Reorder cancelled",
                format!("The {} order change was not saved", self.list.label),
            ));
        }
    }
}
