use async_trait::async_trait;

use super::todo::{NewTodo, TodoId, TodoRecord};

/// Seam to the remote list resource. One call per store operation; no
/// retries, no coordination between calls.
#[async_trait]
pub trait TodoGateway: Send + Sync + 'static {
    async fn list(&self) -> anyhow::Result<Vec<TodoRecord>>;
    async fn create(&self, input: NewTodo) -> anyhow::Result<TodoId>;
    async fn update(&self, id: TodoId, check: bool) -> anyhow::Result<()>;
    async fn delete(&self, id: TodoId) -> anyhow::Result<()>;
}
