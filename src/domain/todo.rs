use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote service at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One todo item as held in the local collection.
///
/// `title` is immutable after creation; only `check` is ever updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoRecord {
    pub id: TodoId,
    pub title: String,
    pub check: bool,
}

/// Creation payload sent to the remote service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub checked: bool,
    pub user_id: u32,
}
