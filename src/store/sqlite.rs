use super::TodoStore;
use crate::core::error::TodoError;
use crate::todo::{NewTodo, Todo, TodoPatch, TodoStatus};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, Error as SqlError, OptionalExtension, params, types::Type};
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'completed')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_todos_status ON todos(status);";

const COLUMNS: &str = "id, title, description, status, created_at, updated_at";

/// SQLite-backed store. Every operation opens its own connection and closes
/// it when done; nothing is held between calls.
#[derive(Debug, Clone)]
pub struct SqliteTodoStore {
    path: PathBuf,
}

impl SqliteTodoStore {
    /// Creates the database file and schema if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TodoError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self { path })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, TodoError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, TodoError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            op(&conn)
        })
        .await?
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    let status_raw: String = row.get(3)?;
    let status = status_raw
        .parse::<TodoStatus>()
        .map_err(|e| SqlError::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn fetch(conn: &Connection, id: i64) -> Result<Option<Todo>, TodoError> {
    let todo = conn
        .query_row(
            &format!("SELECT {} FROM todos WHERE id = ?1", COLUMNS),
            params![id],
            map_row,
        )
        .optional()?;
    Ok(todo)
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn create(&self, new: NewTodo) -> Result<Todo, TodoError> {
        self.run(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO todos (title, description, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    new.title,
                    new.description,
                    TodoStatus::Pending.as_str(),
                    now,
                    now
                ],
            )?;
            let id = conn.last_insert_rowid();
            fetch(conn, id)?
                .ok_or_else(|| TodoError::Store(format!("Inserted todo #{} vanished", id)))
        })
        .await
    }

    async fn list(&self, status: Option<TodoStatus>) -> Result<Vec<Todo>, TodoError> {
        self.run(move |conn| {
            let todos = match status {
                Some(status) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM todos WHERE status = ?1 ORDER BY id",
                        COLUMNS
                    ))?;
                    stmt.query_map(params![status.as_str()], map_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let mut stmt =
                        conn.prepare(&format!("SELECT {} FROM todos ORDER BY id", COLUMNS))?;
                    stmt.query_map([], map_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            Ok(todos)
        })
        .await
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        self.run(move |conn| fetch(conn, id)).await
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, TodoError> {
        self.run(move |conn| {
            let mut todo = fetch(conn, id)?.ok_or(TodoError::NotFound(id))?;
            patch.apply_to(&mut todo);
            todo.updated_at = Utc::now();

            conn.execute(
                "UPDATE todos SET title = ?1, description = ?2, status = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    todo.title,
                    todo.description,
                    todo.status.as_str(),
                    todo.updated_at,
                    id
                ],
            )?;
            Ok(todo)
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<bool, TodoError> {
        self.run(move |conn| {
            let removed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, SqliteTodoStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteTodoStore::open(dir.path().join("nested").join("todos.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn create_assigns_ids_and_defaults_to_pending() {
        let (_dir, store) = temp_store();

        let first = store.create(NewTodo::new("Buy milk", "")).await.unwrap();
        let second = store.create(NewTodo::new("Walk dog", "evening")).await.unwrap();

        assert_eq!(first.title, "Buy milk");
        assert_eq!(first.description, "");
        assert_eq!(first.status, TodoStatus::Pending);
        assert!(second.id > first.id);
        assert_eq!(store.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (_dir, store) = temp_store();
        let a = store.create(NewTodo::new("A", "")).await.unwrap();
        store.create(NewTodo::new("B", "")).await.unwrap();
        store
            .update(a.id, TodoPatch::status(TodoStatus::Completed))
            .await
            .unwrap();

        let done = store.list(Some(TodoStatus::Completed)).await.unwrap();
        let pending = store.list(Some(TodoStatus::Pending)).await.unwrap();

        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, a.id);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "B");
    }

    #[tokio::test]
    async fn update_touches_only_given_fields_and_refreshes_timestamp() {
        let (_dir, store) = temp_store();
        let created = store.create(NewTodo::new("Old", "desc")).await.unwrap();

        let patch = TodoPatch {
            title: Some("New".to_string()),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, "desc");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let reloaded = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.title, "New");
    }

    #[tokio::test]
    async fn missing_ids_are_reported() {
        let (_dir, store) = temp_store();

        assert!(store.get(99).await.unwrap().is_none());
        assert!(!store.delete(99).await.unwrap());
        assert!(matches!(
            store.update(99, TodoPatch::status(TodoStatus::Completed)).await,
            Err(TodoError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let (_dir, store) = temp_store();
        let todo = store.create(NewTodo::new("Gone soon", "")).await.unwrap();

        assert!(store.delete(todo.id).await.unwrap());
        assert!(store.get(todo.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reopening_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.db");
        SqliteTodoStore::open(&path)
            .unwrap()
            .create(NewTodo::new("Persisted", ""))
            .await
            .unwrap();

        let reopened = SqliteTodoStore::open(&path).unwrap();
        let todos = reopened.list(None).await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Persisted");
    }
}
