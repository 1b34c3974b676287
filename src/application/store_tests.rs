use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::store::{Mutation, StoreError, TodoStore};
use crate::domain::gateway::TodoGateway;
use crate::domain::todo::{NewTodo, TodoId, TodoRecord};

#[derive(Default)]
struct FakeState {
    remote: Vec<TodoRecord>,
    created: Vec<NewTodo>,
    next_id: u64,
    fail_list: bool,
    fail_mutations: bool,
    calls: usize,
}

#[derive(Clone, Default)]
struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    fn seed(rows: Vec<TodoRecord>) -> Self {
        let gw = Self::default();
        gw.state.lock().unwrap().remote = rows;
        gw
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }
}

#[async_trait]
impl TodoGateway for FakeGateway {
    async fn list(&self) -> Result<Vec<TodoRecord>> {
        self.with(|s| {
            s.calls += 1;
            if s.fail_list {
                bail!("list unavailable");
            }
            Ok(s.remote.clone())
        })
    }

    async fn create(&self, input: NewTodo) -> Result<TodoId> {
        self.with(|s| {
            s.calls += 1;
            if s.fail_mutations {
                bail!("create rejected");
            }
            s.created.push(input);
            Ok(TodoId(s.next_id))
        })
    }

    async fn update(&self, _id: TodoId, _check: bool) -> Result<()> {
        self.with(|s| {
            s.calls += 1;
            if s.fail_mutations {
                bail!("update rejected");
            }
            Ok(())
        })
    }

    async fn delete(&self, _id: TodoId) -> Result<()> {
        self.with(|s| {
            s.calls += 1;
            if s.fail_mutations {
                bail!("delete rejected");
            }
            Ok(())
        })
    }
}

fn record(id: u64, title: &str) -> TodoRecord {
    TodoRecord { id: TodoId(id), title: title.into(), check: false }
}

#[tokio::test]
async fn load_keeps_first_ten_in_remote_order() {
    let rows: Vec<_> = (1..=12)
        .map(|i| record(i, &format!("{}", (b'A' + (i as u8 - 1)) as char)))
        .collect();
    let mut store = TodoStore::new(FakeGateway::seed(rows.clone()));

    store.load().await.unwrap();

    assert_eq!(store.items(), &rows[..10]);
}

#[tokio::test]
async fn failed_load_empties_the_collection() {
    let gw = FakeGateway::seed(vec![record(1, "A")]);
    let mut store = TodoStore::new(gw.clone());
    store.load().await.unwrap();
    assert_eq!(store.items().len(), 1);

    gw.with(|s| s.fail_list = true);
    let err = store.load().await.unwrap_err();

    assert!(matches!(err, StoreError::LoadFailed(_)));
    assert!(store.items().is_empty());
}

#[tokio::test]
async fn add_appends_unchecked_record_with_remote_id() {
    let gw = FakeGateway::default();
    gw.with(|s| s.next_id = 42);
    let mut store = TodoStore::new(gw.clone());

    let id = store.add("Buy milk").await.unwrap();

    assert_eq!(id, TodoId(42));
    assert_eq!(store.items(), &[record(42, "Buy milk")]);
    // The wire payload carries checked=true and userId=1 even though the
    // local record starts unchecked.
    let sent = gw.with(|s| s.created.clone());
    assert_eq!(
        sent,
        vec![NewTodo { title: "Buy milk".into(), checked: true, user_id: 1 }]
    );
}

#[tokio::test]
async fn add_trims_the_title() {
    let gw = FakeGateway::default();
    gw.with(|s| s.next_id = 7);
    let mut store = TodoStore::new(gw.clone());

    store.add("  walk the dog  ").await.unwrap();

    assert_eq!(store.items()[0].title, "walk the dog");
    assert_eq!(gw.with(|s| s.created[0].title.clone()), "walk the dog");
}

#[tokio::test]
async fn add_rejects_blank_titles_without_any_call() {
    let gw = FakeGateway::default();
    let mut store = TodoStore::new(gw.clone());

    for title in ["", "   ", "\t\n"] {
        let err = store.add(title).await.unwrap_err();
        assert!(matches!(err, StoreError::ValidationRejected));
    }

    assert!(store.items().is_empty());
    assert_eq!(gw.with(|s| s.calls), 0);
}

#[tokio::test]
async fn remove_drops_exactly_the_matching_record() {
    let mut store = TodoStore::new(FakeGateway::seed(vec![record(5, "A"), record(6, "B")]));
    store.load().await.unwrap();

    store.remove(TodoId(5)).await.unwrap();

    assert_eq!(store.items(), &[record(6, "B")]);
}

#[tokio::test]
async fn toggle_changes_only_the_matching_flag() {
    let mut store = TodoStore::new(FakeGateway::seed(vec![record(1, "A"), record(2, "B")]));
    store.load().await.unwrap();

    store.toggle(TodoId(2), true).await.unwrap();

    assert_eq!(store.items()[0], record(1, "A"));
    assert_eq!(
        store.items()[1],
        TodoRecord { id: TodoId(2), title: "B".into(), check: true }
    );
}

#[tokio::test]
async fn toggle_is_idempotent_for_the_same_value() {
    let mut store = TodoStore::new(FakeGateway::seed(vec![record(1, "A")]));
    store.load().await.unwrap();

    store.toggle(TodoId(1), true).await.unwrap();
    let once = store.items().to_vec();
    store.toggle(TodoId(1), true).await.unwrap();

    assert_eq!(store.items(), once.as_slice());
}

#[tokio::test]
async fn failed_mutations_leave_state_unchanged() {
    let gw = FakeGateway::seed(vec![record(1, "A")]);
    let mut store = TodoStore::new(gw.clone());
    store.load().await.unwrap();
    let before = store.items().to_vec();
    gw.with(|s| s.fail_mutations = true);

    let err = store.add("new").await.unwrap_err();
    assert!(matches!(err, StoreError::MutationFailed { op: Mutation::Add, id: None, .. }));

    let err = store.remove(TodoId(1)).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::MutationFailed { op: Mutation::Delete, id: Some(TodoId(1)), .. }
    ));

    let err = store.toggle(TodoId(1), true).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::MutationFailed { op: Mutation::Toggle, id: Some(TodoId(1)), .. }
    ));

    assert_eq!(store.items(), before.as_slice());
}

#[tokio::test]
async fn cancelled_store_rejects_operations_without_side_effects() {
    let gw = FakeGateway::seed(vec![record(1, "A")]);
    let mut store = TodoStore::new(gw.clone());
    store.load().await.unwrap();
    let before = store.items().to_vec();

    store.cancellation_token().cancel();

    assert!(matches!(store.load().await.unwrap_err(), StoreError::Cancelled));
    assert!(matches!(store.add("x").await.unwrap_err(), StoreError::Cancelled));
    assert!(matches!(store.remove(TodoId(1)).await.unwrap_err(), StoreError::Cancelled));
    assert!(matches!(store.toggle(TodoId(1), true).await.unwrap_err(), StoreError::Cancelled));
    assert_eq!(store.items(), before.as_slice());
}
