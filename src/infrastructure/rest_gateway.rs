use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::{
    gateway::TodoGateway,
    todo::{NewTodo, TodoId, TodoRecord},
};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/todos";

/// [`TodoGateway`] over a plain REST collection: GET/POST on the base URL,
/// PUT/DELETE on `{base}/{id}`. Non-2xx responses are errors; update and
/// delete response bodies are ignored.
#[derive(Clone)]
pub struct RestTodoGateway {
    client: Client,
    base_url: String,
}

/// Row shape of the list response. Only `id` and `title` are required;
/// rows without a `check` field load as unchecked.
#[derive(Debug, Deserialize)]
struct RemoteTodo {
    id: TodoId,
    title: String,
    #[serde(default)]
    check: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedTodo {
    id: TodoId,
}

impl RestTodoGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: Client::new(), base_url: base_url.into() }
    }

    fn item_url(&self, id: TodoId) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

#[async_trait]
impl TodoGateway for RestTodoGateway {
    async fn list(&self) -> Result<Vec<TodoRecord>> {
        let rows: Vec<RemoteTodo> = self
            .client
            .get(&self.base_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(count = rows.len(), "listed remote todos");
        Ok(rows
            .into_iter()
            .map(|r| TodoRecord { id: r.id, title: r.title, check: r.check })
            .collect())
    }

    async fn create(&self, input: NewTodo) -> Result<TodoId> {
        let created: CreatedTodo = self
            .client
            .post(&self.base_url)
            .json(&input)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(id = %created.id, "created remote todo");
        Ok(created.id)
    }

    async fn update(&self, id: TodoId, check: bool) -> Result<()> {
        self.client
            .put(self.item_url(id))
            .json(&serde_json::json!({ "check": check }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<()> {
        self.client
            .delete(self.item_url(id))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
