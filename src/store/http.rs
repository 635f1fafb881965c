use super::TodoStore;
use crate::api::wire::{ApiTodo, ApiTodoCreate, ApiTodoUpdate};
use crate::core::error::TodoError;
use crate::todo::{NewTodo, Todo, TodoPatch, TodoStatus};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Client for the `/api/todos` REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpTodoStore {
    client: Client,
    base_url: String,
}

impl HttpTodoStore {
    /// `base_url` points at the API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TodoError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/todos/", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }
}

#[async_trait]
impl TodoStore for HttpTodoStore {
    async fn create(&self, new: NewTodo) -> Result<Todo, TodoError> {
        let body = ApiTodoCreate::from(new);
        let created: ApiTodo = self
            .client
            .post(self.collection_url())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(created.into())
    }

    async fn list(&self, status: Option<TodoStatus>) -> Result<Vec<Todo>, TodoError> {
        let mut request = self.client.get(self.collection_url());
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }

        let todos: Vec<ApiTodo> = request.send().await?.error_for_status()?.json().await?;

        // Servers that ignore the status parameter still get filtered here.
        Ok(todos
            .into_iter()
            .map(Todo::from)
            .filter(|todo| status.is_none_or(|s| todo.status == s))
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        let response = self.client.get(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let todo: ApiTodo = response.error_for_status()?.json().await?;
        Ok(Some(todo.into()))
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, TodoError> {
        let body = ApiTodoUpdate::from(patch);
        let response = self.client.put(self.item_url(id)).json(&body).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TodoError::NotFound(id));
        }
        let todo: ApiTodo = response.error_for_status()?.json().await?;
        Ok(todo.into())
    }

    async fn delete(&self, id: i64) -> Result<bool, TodoError> {
        let response = self.client.delete(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }
}
