use super::intent::{FieldChange, Intent};
use super::prompt::render_format_prompt;
use crate::core::error::TodoError;
use crate::providers::LLMProvider;
use crate::store::TodoStore;
use crate::todo::{NewTodo, Todo, TodoPatch, TodoStatus, render_listing};
use thiserror::Error;

const EMPTY_LIST_MESSAGE: &str = "Your todo list is empty.";

/// Dispatch failures. Each variant displays as the message shown to the user.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to create todo.")]
    CreateFailed(#[source] TodoError),

    #[error("Todo #{0} not found.")]
    NotFound(i64),

    #[error("Failed to update todo #{id}.")]
    UpdateFailed {
        id: i64,
        #[source]
        source: TodoError,
    },

    #[error("Failed to delete todo #{id}.")]
    DeleteFailed { id: i64 },

    #[error(
        "Todo #{id} was not changed: '{field}' is not an editable field. Editable fields are title, description, completed and status."
    )]
    UnsupportedField { id: i64, field: String },
}

/// Executes one intent against the store.
pub struct Dispatcher<'a> {
    store: &'a dyn TodoStore,
    provider: &'a dyn LLMProvider,
}

impl<'a> Dispatcher<'a> {
    pub fn new(store: &'a dyn TodoStore, provider: &'a dyn LLMProvider) -> Self {
        Self { store, provider }
    }

    /// `snapshot` is the listing the intent was interpreted against; LIST
    /// and GET answer from it without touching the store again.
    pub async fn dispatch(&self, intent: Intent, snapshot: &[Todo]) -> Result<String, DispatchError> {
        match intent {
            Intent::Create { title, description } => self.create(title, description).await,
            Intent::Update { id, change } => self.update(id, change).await,
            Intent::SetCompletion { id, completed } => self.set_completion(id, completed).await,
            Intent::Delete { id } => self.delete(id).await,
            Intent::List { status } => Ok(self.list(snapshot, status).await),
            Intent::Get { id } => snapshot
                .iter()
                .find(|todo| todo.id == id)
                .map(Todo::detail)
                .ok_or(DispatchError::NotFound(id)),
            Intent::Unknown { explanation } => Ok(format!(
                "I'm not sure what you want to do. The assistant says: {}",
                explanation
            )),
        }
    }

    async fn create(&self, title: String, description: String) -> Result<String, DispatchError> {
        let todo = self
            .store
            .create(NewTodo::new(title, description))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "create failed");
                DispatchError::CreateFailed(e)
            })?;
        tracing::info!(id = todo.id, "created todo");
        Ok(format!("Created new todo: '{}'", todo.title))
    }

    async fn update(&self, id: i64, change: FieldChange) -> Result<String, DispatchError> {
        // Existence is checked before the field name, so an unsupported field
        // on a missing id reports "not found".
        match self.store.get(id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(DispatchError::NotFound(id)),
            Err(source) => return Err(DispatchError::UpdateFailed { id, source }),
        }

        let patch = match &change {
            FieldChange::Title(title) => TodoPatch {
                title: Some(title.clone()),
                ..Default::default()
            },
            FieldChange::Description(description) => TodoPatch {
                description: Some(description.clone()),
                ..Default::default()
            },
            FieldChange::Completed(done) => TodoPatch::status(TodoStatus::from_completed(*done)),
            FieldChange::Status(status) => TodoPatch::status(*status),
            FieldChange::Unsupported { field, .. } => {
                return Err(DispatchError::UnsupportedField {
                    id,
                    field: field.clone(),
                });
            }
        };

        self.apply(id, patch).await?;
        Ok(format!(
            "Updated todo #{}: {} set to '{}'",
            id,
            change.field_name(),
            change.value_text()
        ))
    }

    async fn set_completion(&self, id: i64, completed: bool) -> Result<String, DispatchError> {
        self.apply(id, TodoPatch::status(TodoStatus::from_completed(completed)))
            .await?;
        if completed {
            Ok(format!("Todo #{} completed.", id))
        } else {
            Ok(format!("Todo #{} marked as incomplete.", id))
        }
    }

    async fn apply(&self, id: i64, patch: TodoPatch) -> Result<Todo, DispatchError> {
        self.store.update(id, patch).await.map_err(|e| match e {
            TodoError::NotFound(id) => DispatchError::NotFound(id),
            source => {
                tracing::error!(id, error = %source, "update failed");
                DispatchError::UpdateFailed { id, source }
            }
        })
    }

    async fn delete(&self, id: i64) -> Result<String, DispatchError> {
        match self.store.delete(id).await {
            Ok(true) => Ok(format!("Deleted todo #{}.", id)),
            Ok(false) => Err(DispatchError::DeleteFailed { id }),
            Err(e) => {
                tracing::error!(id, error = %e, "delete failed");
                Err(DispatchError::DeleteFailed { id })
            }
        }
    }

    async fn list(&self, snapshot: &[Todo], status: Option<TodoStatus>) -> String {
        if snapshot.is_empty() {
            return EMPTY_LIST_MESSAGE.to_string();
        }

        let selected: Vec<Todo> = snapshot
            .iter()
            .filter(|todo| status.is_none_or(|s| todo.status == s))
            .cloned()
            .collect();
        if selected.is_empty() {
            return format!("No {} todos.", status.map_or("matching", |s| s.as_str()));
        }

        let listing = render_listing(&selected);
        match self.provider.complete(&render_format_prompt(&listing)).await {
            Ok(formatted) => formatted,
            Err(e) => {
                tracing::warn!(error = %e, "list formatting failed, showing raw listing");
                listing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::ScriptedProvider;
    use crate::store::SqliteTodoStore;
    use crate::todo::sample;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SqliteTodoStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteTodoStore::open(dir.path().join("todos.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn create_stores_one_pending_record() {
        let (_dir, store) = open_store();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);

        let message = dispatcher
            .dispatch(
                Intent::Create {
                    title: "Buy milk".to_string(),
                    description: String::new(),
                },
                &[],
            )
            .await
            .unwrap();

        assert_eq!(message, "Created new todo: 'Buy milk'");
        let todos = store.list(None).await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Buy milk");
        assert_eq!(todos[0].description, "");
        assert_eq!(todos[0].status, TodoStatus::Pending);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn update_sets_single_field() {
        let (_dir, store) = open_store();
        let todo = store.create(NewTodo::new("Call mom", "")).await.unwrap();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);

        let message = dispatcher
            .dispatch(
                Intent::Update {
                    id: todo.id,
                    change: FieldChange::Description("high priority".to_string()),
                },
                &[],
            )
            .await
            .unwrap();

        assert_eq!(
            message,
            format!("Updated todo #{}: description set to 'high priority'", todo.id)
        );
        let stored = store.get(todo.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Call mom");
        assert_eq!(stored.description, "high priority");
    }

    #[tokio::test]
    async fn unsupported_field_never_mutates() {
        let (_dir, store) = open_store();
        let todo = store.create(NewTodo::new("Call mom", "x")).await.unwrap();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);

        let err = dispatcher
            .dispatch(
                Intent::Update {
                    id: todo.id,
                    change: FieldChange::Unsupported {
                        field: "priority".to_string(),
                        value: "high".to_string(),
                    },
                },
                &[],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::UnsupportedField { .. }));
        assert!(err.to_string().contains("'priority' is not an editable field"));
        assert_eq!(store.get(todo.id).await.unwrap().unwrap(), todo);
    }

    #[tokio::test]
    async fn update_checks_existence_first() {
        let (_dir, store) = open_store();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);

        let err = dispatcher
            .dispatch(
                Intent::Update {
                    id: 42,
                    change: FieldChange::Unsupported {
                        field: "priority".to_string(),
                        value: "high".to_string(),
                    },
                },
                &[],
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Todo #42 not found.");
    }

    #[tokio::test]
    async fn set_completion_messages() {
        let (_dir, store) = open_store();
        let todo = store.create(NewTodo::new("Buy milk", "")).await.unwrap();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);

        let done = dispatcher
            .dispatch(
                Intent::SetCompletion {
                    id: todo.id,
                    completed: true,
                },
                &[],
            )
            .await
            .unwrap();
        assert_eq!(done, format!("Todo #{} completed.", todo.id));
        assert!(store.get(todo.id).await.unwrap().unwrap().is_completed());

        let undone = dispatcher
            .dispatch(
                Intent::SetCompletion {
                    id: todo.id,
                    completed: false,
                },
                &[],
            )
            .await
            .unwrap();
        assert_eq!(undone, format!("Todo #{} marked as incomplete.", todo.id));

        let missing = dispatcher
            .dispatch(
                Intent::SetCompletion {
                    id: 99,
                    completed: true,
                },
                &[],
            )
            .await
            .unwrap_err();
        assert_eq!(missing.to_string(), "Todo #99 not found.");
    }

    #[tokio::test]
    async fn delete_reports_success_and_failure() {
        let (_dir, store) = open_store();
        let todo = store.create(NewTodo::new("Old", "")).await.unwrap();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);

        let message = dispatcher
            .dispatch(Intent::Delete { id: todo.id }, &[])
            .await
            .unwrap();
        assert_eq!(message, format!("Deleted todo #{}.", todo.id));

        let err = dispatcher
            .dispatch(Intent::Delete { id: todo.id }, &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Failed to delete todo #{}.", todo.id));
    }

    #[tokio::test]
    async fn empty_list_skips_formatting_call() {
        let (_dir, store) = open_store();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);

        let message = dispatcher
            .dispatch(Intent::List { status: None }, &[])
            .await
            .unwrap();

        assert_eq!(message, "Your todo list is empty.");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn list_asks_for_reformat_and_falls_back_to_raw() {
        let (_dir, store) = open_store();
        let snapshot = vec![
            sample(1, "Buy milk", "", TodoStatus::Pending),
            sample(2, "Call mom", "", TodoStatus::Completed),
        ];

        let provider = ScriptedProvider::new().reply("- [ ] Buy milk\n- [x] Call mom");
        let dispatcher = Dispatcher::new(&store, &provider);
        let formatted = dispatcher
            .dispatch(Intent::List { status: None }, &snapshot)
            .await
            .unwrap();
        assert_eq!(formatted, "- [ ] Buy milk\n- [x] Call mom");
        assert!(provider.requests()[0][0]
            .content
            .starts_with("Please format this todo list in a clean, user-friendly way:"));

        let provider = ScriptedProvider::new().fail("timeout");
        let dispatcher = Dispatcher::new(&store, &provider);
        let raw = dispatcher
            .dispatch(
                Intent::List {
                    status: Some(TodoStatus::Pending),
                },
                &snapshot,
            )
            .await
            .unwrap();
        assert_eq!(raw, "1: Buy milk - No description - Not completed");
    }

    #[tokio::test]
    async fn filtered_list_without_matches() {
        let (_dir, store) = open_store();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);
        let snapshot = vec![sample(1, "Buy milk", "", TodoStatus::Pending)];

        let message = dispatcher
            .dispatch(
                Intent::List {
                    status: Some(TodoStatus::Completed),
                },
                &snapshot,
            )
            .await
            .unwrap();

        assert_eq!(message, "No completed todos.");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn get_reads_from_snapshot() {
        let (_dir, store) = open_store();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);
        let snapshot = vec![sample(3, "Buy milk", "", TodoStatus::Pending)];

        let detail = dispatcher
            .dispatch(Intent::Get { id: 3 }, &snapshot)
            .await
            .unwrap();
        assert_eq!(
            detail,
            "Todo #3: Buy milk\nDescription: None\nStatus: Not completed"
        );

        let err = dispatcher
            .dispatch(Intent::Get { id: 4 }, &snapshot)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Todo #4 not found.");
    }

    #[tokio::test]
    async fn unknown_echoes_explanation() {
        let (_dir, store) = open_store();
        let provider = ScriptedProvider::new();
        let dispatcher = Dispatcher::new(&store, &provider);

        let message = dispatcher
            .dispatch(
                Intent::Unknown {
                    explanation: "That is not a todo request.".to_string(),
                },
                &[],
            )
            .await
            .unwrap();

        assert_eq!(
            message,
            "I'm not sure what you want to do. The assistant says: That is not a todo request."
        );
    }
}
