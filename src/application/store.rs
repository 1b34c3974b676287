use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::domain::gateway::TodoGateway;
use crate::domain::todo::{NewTodo, TodoId, TodoRecord};

/// How many entries of the remote collection the initial load keeps.
pub const LOAD_LIMIT: usize = 10;

const DEFAULT_USER_ID: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Add,
    Delete,
    Toggle,
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mutation::Add => "add",
            Mutation::Delete => "delete",
            Mutation::Toggle => "toggle",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("loading the todo collection failed")]
    LoadFailed(#[source] anyhow::Error),
    #[error("{op} failed")]
    MutationFailed {
        op: Mutation,
        id: Option<TodoId>,
        #[source]
        source: anyhow::Error,
    },
    #[error("title must not be empty")]
    ValidationRejected,
    #[error("store operation cancelled")]
    Cancelled,
}

/// In-memory mirror of the remote todo collection.
///
/// Every mutation updates local state and fires exactly one remote call; a
/// failed call leaves local state untouched (a failed [`load`](Self::load)
/// leaves it empty). Nothing is retried or rolled back. The store is owned
/// by the root view and mutated only from its task, so each mutation is a
/// single atomic snapshot change as far as rendering is concerned.
pub struct TodoStore<G: TodoGateway> {
    gateway: G,
    items: Vec<TodoRecord>,
    cancel: CancellationToken,
}

impl<G: TodoGateway> TodoStore<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway, items: Vec::new(), cancel: CancellationToken::new() }
    }

    /// Current collection snapshot, in insertion order.
    pub fn items(&self) -> &[TodoRecord] {
        &self.items
    }

    /// Token tied to the owning view. Cancelling it abandons any in-flight
    /// remote call and makes every later operation return
    /// [`StoreError::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replace local state with the first [`LOAD_LIMIT`] remote entries, in
    /// the order the remote returned them. On failure the collection is
    /// emptied.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        let res = race(&self.cancel, self.gateway.list())
            .await
            .ok_or(StoreError::Cancelled)?;
        match res {
            Ok(mut remote) => {
                remote.truncate(LOAD_LIMIT);
                self.items = remote;
                tracing::debug!(count = self.items.len(), "loaded todo collection");
                Ok(())
            }
            Err(e) => {
                self.items = Vec::new();
                tracing::warn!(error = %e, "load failed, collection emptied");
                Err(StoreError::LoadFailed(e))
            }
        }
    }

    /// Create a todo remotely and append it locally. Whitespace-only titles
    /// are rejected before any network call.
    pub async fn add(&mut self, title: &str) -> Result<TodoId, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::ValidationRejected);
        }
        let input = NewTodo {
            title: title.to_owned(),
            checked: true,
            user_id: DEFAULT_USER_ID,
        };
        let res = race(&self.cancel, self.gateway.create(input))
            .await
            .ok_or(StoreError::Cancelled)?;
        let id = res.map_err(|e| {
            tracing::warn!(error = %e, "add failed");
            StoreError::MutationFailed { op: Mutation::Add, id: None, source: e }
        })?;
        // The create payload reports checked=true, but a freshly created
        // record always starts unchecked locally.
        self.items.push(TodoRecord { id, title: title.to_owned(), check: false });
        Ok(id)
    }

    /// Delete a todo remotely and drop the matching record locally.
    pub async fn remove(&mut self, id: TodoId) -> Result<(), StoreError> {
        let res = race(&self.cancel, self.gateway.delete(id))
            .await
            .ok_or(StoreError::Cancelled)?;
        res.map_err(|e| {
            tracing::warn!(%id, error = %e, "delete failed");
            StoreError::MutationFailed { op: Mutation::Delete, id: Some(id), source: e }
        })?;
        self.items.retain(|t| t.id != id);
        Ok(())
    }

    /// Update a todo's completion flag remotely and locally. Only the
    /// matching record's `check` field changes.
    pub async fn toggle(&mut self, id: TodoId, check: bool) -> Result<(), StoreError> {
        let res = race(&self.cancel, self.gateway.update(id, check))
            .await
            .ok_or(StoreError::Cancelled)?;
        res.map_err(|e| {
            tracing::warn!(%id, check, error = %e, "toggle failed");
            StoreError::MutationFailed { op: Mutation::Toggle, id: Some(id), source: e }
        })?;
        if let Some(item) = self.items.iter_mut().find(|t| t.id == id) {
            item.check = check;
        }
        Ok(())
    }
}

/// Run one gateway call, giving the cancellation token priority. `None`
/// means the token fired first.
async fn race<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> Option<anyhow::Result<T>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        res = fut => Some(res),
    }
}
