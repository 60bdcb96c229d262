// catalog-order/tests/persistence.rs
// Commit pipeline behaviour with a store that holds calls until released

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use catalog_order::{
    ChannelNotifier, CommitMode, CommitOutcome, InMemoryOrderStore, NotificationLevel, OptimisticOrderPersistence,
    OrderAssignment, PersistenceError, RemoteOrderStore, SyncState, TracingNotifier,
};
use shared::models::Product;
use tokio::sync::{Semaphore, mpsc};

/// Store whose calls block until a permit is released
struct GatedStore {
    gate: Semaphore,
    started: mpsc::UnboundedSender<()>,
    outcomes: Mutex<VecDeque<Result<(), String>>>,
    batches: Mutex<Vec<Vec<OrderAssignment>>>,
}

impl GatedStore {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (started, rx) = mpsc::unbounded_channel();
        let store = Arc::new(Self {
            gate: Semaphore::new(0),
            started,
            outcomes: Mutex::new(VecDeque::new()),
            batches: Mutex::new(Vec::new()),
        });
        (store, rx)
    }

    fn release(&self, outcome: Result<(), &str>) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(outcome.map_err(str::to_string));
        self.gate.add_permits(1);
    }

    fn batches(&self) -> Vec<Vec<OrderAssignment>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteOrderStore for GatedStore {
    async fn set_order(&self, assignments: &[OrderAssignment]) -> Result<(), PersistenceError> {
        self.batches.lock().unwrap().push(assignments.to_vec());
        let _ = self.started.send(());
        self.gate
            .acquire()
            .await
            .map_err(|e| PersistenceError::new(e.to_string()))?
            .forget();
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Err(message)) => Err(PersistenceError::new(message)),
            _ => Ok(()),
        }
    }

    async fn set_item_order(&self, id: &str, order: u32) -> Result<(), PersistenceError> {
        self.set_order(&[OrderAssignment::new(id, order)]).await
    }
}

fn product(id: &str, sort_order: i32) -> Product {
    Product {
        id: id.to_string(),
        name: id.to_uppercase(),
        image: String::new(),
        category: "drinks".to_string(),
        sort_order,
        price: 350,
        stock: 10,
        is_active: true,
    }
}

fn products(ids: &[&str]) -> Vec<Product> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| product(id, i as i32 + 1))
        .collect()
}

fn ids(items: &[Product]) -> Vec<String> {
    items.iter().map(|p| p.id.clone()).collect()
}

/// Yield until `check` holds; the spawned tasks only run when we yield
async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached");
}

#[tokio::test]
async fn test_move_scenario_with_products() {
    let store = Arc::new(InMemoryOrderStore::with_order(&OrderAssignment::dense([
        "a", "b", "c", "d",
    ])));
    let list = OptimisticOrderPersistence::keyed(
        products(&["a", "b", "c", "d"]),
        Arc::clone(&store),
        TracingNotifier,
    )
    .unwrap()
    .with_label("product");

    assert_eq!(list.move_item(0, 2).await.unwrap(), CommitOutcome::Committed);
    assert_eq!(ids(&list.items()), ["b", "c", "a", "d"]);
    assert_eq!(
        list.assignments(),
        vec![
            OrderAssignment::new("b", 1),
            OrderAssignment::new("c", 2),
            OrderAssignment::new("a", 3),
            OrderAssignment::new("d", 4),
        ]
    );
    assert_eq!(store.ranked_ids(), ["b", "c", "a", "d"]);
}

#[tokio::test]
async fn test_failure_scenario_reverts_and_notifies() {
    let store = Arc::new(InMemoryOrderStore::new());
    store.fail_with("network timeout");
    let notifier = ChannelNotifier::new(8);
    let mut toasts = notifier.subscribe();

    let list = OptimisticOrderPersistence::keyed(
        products(&["a", "b", "c", "d"]),
        Arc::clone(&store),
        notifier,
    )
    .unwrap();

    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    list.on_order_change(move |items: &[Product]| {
        sink.lock().unwrap().push(ids(items));
    });

    let outcome = list.move_item(0, 2).await.unwrap();

    assert!(matches!(outcome, CommitOutcome::Reverted(ref e) if e.message() == "network timeout"));
    assert_eq!(ids(&list.items()), ["a", "b", "c", "d"]);
    assert_eq!(ids(&list.baseline()), ["a", "b", "c", "d"]);

    // Optimistic order first, then the restored baseline
    assert_eq!(
        *observed.lock().unwrap(),
        vec![vec!["b", "c", "a", "d"], vec!["a", "b", "c", "d"]]
    );

    let toast = toasts.recv().await.unwrap();
    assert_eq!(toast.level, NotificationLevel::Error);
    assert_eq!(toast.message, "network timeout");
}

#[tokio::test]
async fn test_commits_are_serialized_and_coalesced() {
    let (store, mut started) = GatedStore::new();
    let list = Arc::new(
        OptimisticOrderPersistence::keyed(
            products(&["a", "b", "c", "d"]),
            Arc::clone(&store),
            TracingNotifier,
        )
        .unwrap(),
    );

    let first = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(0, 3).await }
    });
    started.recv().await.unwrap();
    assert_eq!(list.state(), SyncState::PendingCommit);

    // Local moves keep applying while the first commit is in flight
    let second = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(0, 1).await }
    });
    wait_until(|| ids(&list.items()) == ["c", "b", "d", "a"]).await;

    let third = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(0, 1).await }
    });
    wait_until(|| ids(&list.items()) == ["b", "c", "d", "a"]).await;

    store.release(Ok(()));
    assert_eq!(first.await.unwrap().unwrap(), CommitOutcome::Committed);

    started.recv().await.unwrap();
    store.release(Ok(()));
    assert_eq!(second.await.unwrap().unwrap(), CommitOutcome::Superseded);
    assert_eq!(third.await.unwrap().unwrap(), CommitOutcome::Committed);

    let batches = store.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0], OrderAssignment::dense(["b", "c", "d", "a"]));
    assert_eq!(batches[1], OrderAssignment::dense(["b", "c", "d", "a"]));

    assert_eq!(list.state(), SyncState::Synced);
    assert_eq!(ids(&list.baseline()), ["b", "c", "d", "a"]);
}

#[tokio::test]
async fn test_revert_discards_queued_commits() {
    let (store, mut started) = GatedStore::new();
    let list = Arc::new(
        OptimisticOrderPersistence::keyed(
            products(&["a", "b", "c"]),
            Arc::clone(&store),
            TracingNotifier,
        )
        .unwrap(),
    );

    let first = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(2, 0).await }
    });
    started.recv().await.unwrap();

    let second = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(1, 2).await }
    });
    wait_until(|| ids(&list.items()) == ["c", "b", "a"]).await;

    store.release(Err("validation failed"));

    assert!(matches!(
        first.await.unwrap().unwrap(),
        CommitOutcome::Reverted(_)
    ));
    assert_eq!(second.await.unwrap().unwrap(), CommitOutcome::Discarded);

    assert_eq!(store.batches().len(), 1);
    assert_eq!(ids(&list.items()), ["a", "b", "c"]);
    assert_eq!(ids(&list.baseline()), ["a", "b", "c"]);
    assert_eq!(list.state(), SyncState::Synced);
}

#[tokio::test]
async fn test_refresh_during_commit_wins() {
    let (store, mut started) = GatedStore::new();
    let notifier = ChannelNotifier::new(8);
    let mut toasts = notifier.subscribe();
    let list = Arc::new(
        OptimisticOrderPersistence::keyed(products(&["a", "b"]), Arc::clone(&store), notifier)
            .unwrap(),
    );

    let pending = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(0, 1).await }
    });
    started.recv().await.unwrap();

    list.initialize(products(&["x", "y", "z"])).unwrap();
    assert_eq!(toasts.recv().await.unwrap().level, NotificationLevel::Warning);

    store.release(Ok(()));
    assert_eq!(pending.await.unwrap().unwrap(), CommitOutcome::Discarded);
    assert_eq!(ids(&list.baseline()), ["x", "y", "z"]);
    assert_eq!(list.state(), SyncState::Synced);
}

#[tokio::test]
async fn test_abandoned_commit_reverts() {
    let (store, mut started) = GatedStore::new();
    let notifier = ChannelNotifier::new(8);
    let mut toasts = notifier.subscribe();
    let list = OptimisticOrderPersistence::keyed(
        products(&["a", "b", "c"]),
        Arc::clone(&store),
        notifier,
    )
    .unwrap();

    // The store never answers; the caller gives up
    let abandoned = tokio::time::timeout(Duration::from_millis(50), list.move_item(0, 2)).await;
    assert!(abandoned.is_err());
    started.recv().await.unwrap();

    assert_eq!(list.state(), SyncState::Synced);
    assert_eq!(ids(&list.items()), ["a", "b", "c"]);
    assert_eq!(ids(&list.baseline()), ["a", "b", "c"]);
    assert_eq!(toasts.recv().await.unwrap().level, NotificationLevel::Warning);

    // The list keeps working afterwards
    store.release(Ok(()));
    assert_eq!(list.move_item(0, 1).await.unwrap(), CommitOutcome::Committed);
    assert_eq!(list.state(), SyncState::Synced);
    assert_eq!(ids(&list.baseline()), ["b", "a", "c"]);
}

#[tokio::test]
async fn test_abandoned_queued_commit_reverts() {
    let (store, mut started) = GatedStore::new();
    let list = Arc::new(
        OptimisticOrderPersistence::keyed(
            products(&["a", "b", "c"]),
            Arc::clone(&store),
            TracingNotifier,
        )
        .unwrap(),
    );

    let first = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(0, 1).await }
    });
    started.recv().await.unwrap();

    // Queued behind the first commit, then dropped
    let queued = tokio::time::timeout(Duration::from_millis(50), list.move_item(2, 0)).await;
    assert!(queued.is_err());
    assert_eq!(ids(&list.items()), ["a", "b", "c"]);
    assert_eq!(list.state(), SyncState::Synced);

    store.release(Ok(()));
    assert_eq!(first.await.unwrap().unwrap(), CommitOutcome::Discarded);
    assert_eq!(ids(&list.baseline()), ["a", "b", "c"]);
    assert_eq!(list.state(), SyncState::Synced);
}

#[tokio::test]
async fn test_single_item_failure_reverts_and_discards_queue() {
    let (store, mut started) = GatedStore::new();
    let list = Arc::new(
        OptimisticOrderPersistence::keyed(
            products(&["a", "b", "c"]),
            Arc::clone(&store),
            TracingNotifier,
        )
        .unwrap()
        .with_mode(CommitMode::SingleItem),
    );

    let first = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(2, 0).await }
    });
    started.recv().await.unwrap();

    let second = tokio::spawn({
        let list = Arc::clone(&list);
        async move { list.move_item(1, 2).await }
    });
    wait_until(|| ids(&list.items()) == ["c", "b", "a"]).await;

    store.release(Err("slider locked"));

    assert!(matches!(
        first.await.unwrap().unwrap(),
        CommitOutcome::Reverted(ref e) if e.message() == "slider locked"
    ));
    assert_eq!(second.await.unwrap().unwrap(), CommitOutcome::Discarded);

    assert_eq!(store.batches(), vec![vec![OrderAssignment::new("c", 1)]]);
    assert_eq!(ids(&list.items()), ["a", "b", "c"]);
    assert_eq!(ids(&list.baseline()), ["a", "b", "c"]);
    assert_eq!(list.state(), SyncState::Synced);
}
