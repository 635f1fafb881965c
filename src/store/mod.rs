use crate::config::StoreConfig;
use crate::core::error::TodoError;
use crate::todo::{NewTodo, Todo, TodoPatch, TodoStatus};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod http;
pub mod sqlite;

pub use http::HttpTodoStore;
pub use sqlite::SqliteTodoStore;

/// Persistence boundary for todo records.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, new: NewTodo) -> Result<Todo, TodoError>;

    /// All records in id order, optionally restricted to one status.
    async fn list(&self, status: Option<TodoStatus>) -> Result<Vec<Todo>, TodoError>;

    async fn get(&self, id: i64) -> Result<Option<Todo>, TodoError>;

    /// Applies the set fields of `patch` and refreshes `updated_at`.
    /// Fails with [`TodoError::NotFound`] when `id` does not exist.
    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, TodoError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: i64) -> Result<bool, TodoError>;
}

pub fn open_store(
    config: &StoreConfig,
    timeout: Duration,
) -> Result<Arc<dyn TodoStore>, TodoError> {
    match config {
        StoreConfig::Sqlite { path } => {
            let store = SqliteTodoStore::open(path)?;
            tracing::debug!(path = %path.display(), "opened sqlite todo store");
            Ok(Arc::new(store))
        }
        StoreConfig::Http { base_url } => {
            let store = HttpTodoStore::new(base_url, timeout)?;
            tracing::debug!(%base_url, "using remote todo store");
            Ok(Arc::new(store))
        }
    }
}
