pub mod wire;

use crate::core::error::TodoError;
use crate::store::TodoStore;
use crate::todo::{NewTodo, TodoPatch, TodoStatus};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use wire::{ApiTodo, ApiTodoCreate, ApiTodoUpdate};

const DEFAULT_PAGE_LIMIT: usize = 100;

#[derive(Clone)]
struct ApiState {
    store: Arc<dyn TodoStore>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    skip: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    status: Option<String>,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

enum ApiError {
    NotFound,
    Invalid(String),
    Internal(String),
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::NotFound(_) => ApiError::NotFound,
            TodoError::InvalidArgument(msg) => ApiError::Invalid(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Todo not found".to_string()),
            ApiError::Invalid(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "todo API request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// JSON CRUD routes under `/api/todos`, the ones [`crate::store::HttpTodoStore`]
/// talks to.
pub fn router(store: Arc<dyn TodoStore>) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(read_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(ApiState { store })
}

pub async fn serve(host: &str, port: u16, store: Arc<dyn TodoStore>) -> Result<(), TodoError> {
    let listener = TcpListener::bind((host, port)).await?;
    serve_with_listener(listener, store).await
}

pub async fn serve_with_listener(
    listener: TcpListener,
    store: Arc<dyn TodoStore>,
) -> Result<(), TodoError> {
    tracing::info!(addr = %listener.local_addr()?, "todo API listening");
    axum::serve(listener, router(store)).await?;
    Ok(())
}

async fn list_todos(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ApiTodo>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<TodoStatus>)
        .transpose()?;

    let todos = state.store.list(status).await?;
    Ok(Json(
        todos
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .map(ApiTodo::from)
            .collect(),
    ))
}

async fn read_todo(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiTodo>, ApiError> {
    let todo = state.store.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(todo.into()))
}

async fn create_todo(
    State(state): State<ApiState>,
    Json(body): Json<ApiTodoCreate>,
) -> Result<(StatusCode, Json<ApiTodo>), ApiError> {
    let new = NewTodo::from(body);
    if new.title.trim().is_empty() {
        return Err(ApiError::Invalid("title must not be empty".to_string()));
    }

    let todo = state.store.create(new).await?;
    tracing::info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo.into())))
}

async fn update_todo(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(body): Json<ApiTodoUpdate>,
) -> Result<Json<ApiTodo>, ApiError> {
    let patch = TodoPatch::from(body);
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::Invalid("title must not be empty".to_string()));
    }

    let todo = state.store.update(id, patch).await?;
    Ok(Json(todo.into()))
}

async fn delete_todo(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(id).await? {
        tracing::info!(id, "deleted todo");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HttpTodoStore, SqliteTodoStore};
    use std::time::Duration;
    use tempfile::TempDir;

    async fn spawn_api() -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn TodoStore> =
            Arc::new(SqliteTodoStore::open(dir.path().join("api.db")).unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve_with_listener(listener, store));
        (dir, format!("http://{}/api", addr))
    }

    #[tokio::test]
    async fn http_store_round_trips_through_api() {
        let (_dir, base_url) = spawn_api().await;
        let store = HttpTodoStore::new(&base_url, Duration::from_secs(5)).unwrap();

        let created = store.create(NewTodo::new("Buy milk", "")).await.unwrap();
        assert_eq!(created.title, "Buy milk");
        assert_eq!(created.status, TodoStatus::Pending);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.detail().lines().nth(1), Some("Description: None"));

        let done = store
            .update(created.id, TodoPatch::status(TodoStatus::Completed))
            .await
            .unwrap();
        assert!(done.is_completed());

        let completed = store.list(Some(TodoStatus::Completed)).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert!(store.list(Some(TodoStatus::Pending)).await.unwrap().is_empty());

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_missing_todo_is_not_found() {
        let (_dir, base_url) = spawn_api().await;
        let store = HttpTodoStore::new(&base_url, Duration::from_secs(5)).unwrap();

        let result = store
            .update(404, TodoPatch::status(TodoStatus::Completed))
            .await;
        assert!(matches!(result, Err(TodoError::NotFound(404))));
    }

    #[tokio::test]
    async fn rejects_empty_title_and_bad_status_filter() {
        let (_dir, base_url) = spawn_api().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/todos/", base_url))
            .json(&json!({ "title": "  " }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = client
            .get(format!("{}/todos/?status=someday", base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
