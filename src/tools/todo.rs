use super::{Tool, ToolSet, error_value, parse_args};
use crate::core::error::TodoError;
use crate::store::TodoStore;
use crate::todo::{NewTodo, Todo, TodoPatch, TodoStatus};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Builds the tool set served over MCP and to the tool-calling chat mode.
pub fn todo_tools(store: Arc<dyn TodoStore>) -> ToolSet {
    let mut set = ToolSet::new();
    set.add_tool(Arc::new(AddTodo(store.clone())));
    set.add_tool(Arc::new(ListTodos(store.clone())));
    set.add_tool(Arc::new(GetTodo(store.clone())));
    set.add_tool(Arc::new(UpdateTodo(store.clone())));
    set.add_tool(Arc::new(ToggleTodo(store.clone())));
    set.add_tool(Arc::new(DeleteTodo(store)));
    set
}

fn record(result: Result<Todo, TodoError>) -> Value {
    match result.and_then(|todo| Ok(serde_json::to_value(todo)?)) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "todo tool failed");
            error_value(e.to_string())
        }
    }
}

fn parse_status(raw: &str) -> Result<TodoStatus, Value> {
    raw.parse::<TodoStatus>()
        .map_err(|_| error_value(format!("Invalid status '{}'. Must be 'pending' or 'completed'.", raw)))
}

fn id_schema() -> Value {
    json!({ "type": "integer", "description": "The todo id" })
}

#[derive(Deserialize)]
struct IdArgs {
    id: i64,
}

pub struct AddTodo(Arc<dyn TodoStore>);

#[derive(Deserialize)]
struct AddTodoArgs {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl Tool for AddTodo {
    fn name(&self) -> &str {
        "add_todo"
    }

    fn description(&self) -> &str {
        "Create a new todo item"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Short title of the todo" },
                "description": { "type": "string", "description": "Optional details" }
            },
            "required": ["title"]
        })
    }

    async fn call(&self, args: Value) -> Value {
        let args: AddTodoArgs = match parse_args(args) {
            Ok(args) => args,
            Err(e) => return e,
        };
        let title = args.title.trim();
        if title.is_empty() {
            return error_value("Title must not be empty.");
        }

        let new = NewTodo::new(title, args.description.unwrap_or_default().trim());
        record(self.0.create(new).await)
    }
}

pub struct ListTodos(Arc<dyn TodoStore>);

#[derive(Deserialize)]
struct ListTodosArgs {
    #[serde(default)]
    status: Option<String>,
}

#[async_trait]
impl Tool for ListTodos {
    fn name(&self) -> &str {
        "list_todos"
    }

    fn description(&self) -> &str {
        "List todo items, optionally only pending or completed ones"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "enum": ["pending", "completed"] }
            }
        })
    }

    async fn call(&self, args: Value) -> Value {
        let args: ListTodosArgs = match parse_args(args) {
            Ok(args) => args,
            Err(e) => return e,
        };
        let status = match args.status.as_deref().map(parse_status).transpose() {
            Ok(status) => status,
            Err(e) => return e,
        };

        match self.0.list(status).await {
            Ok(todos) => json!({ "count": todos.len(), "todos": todos }),
            Err(e) => error_value(e.to_string()),
        }
    }
}

pub struct GetTodo(Arc<dyn TodoStore>);

#[async_trait]
impl Tool for GetTodo {
    fn name(&self) -> &str {
        "get_todo"
    }

    fn description(&self) -> &str {
        "Get one todo item by id"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "id": id_schema() },
            "required": ["id"]
        })
    }

    async fn call(&self, args: Value) -> Value {
        let IdArgs { id } = match parse_args(args) {
            Ok(args) => args,
            Err(e) => return e,
        };
        record(
            self.0
                .get(id)
                .await
                .and_then(|todo| todo.ok_or(TodoError::NotFound(id))),
        )
    }
}

pub struct UpdateTodo(Arc<dyn TodoStore>);

#[derive(Deserialize)]
struct UpdateTodoArgs {
    id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[async_trait]
impl Tool for UpdateTodo {
    fn name(&self) -> &str {
        "update_todo"
    }

    fn description(&self) -> &str {
        "Change the title, description or status of a todo item"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": id_schema(),
                "title": { "type": "string" },
                "description": { "type": "string" },
                "status": { "type": "string", "enum": ["pending", "completed"] }
            },
            "required": ["id"]
        })
    }

    async fn call(&self, args: Value) -> Value {
        let args: UpdateTodoArgs = match parse_args(args) {
            Ok(args) => args,
            Err(e) => return e,
        };
        let status = match args.status.as_deref().map(parse_status).transpose() {
            Ok(status) => status,
            Err(e) => return e,
        };
        if args.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return error_value("Title must not be empty.");
        }

        let patch = TodoPatch {
            title: args.title.map(|t| t.trim().to_string()),
            description: args.description,
            status,
        };
        if patch.is_empty() {
            return error_value("No fields to update. Provide title, description or status.");
        }

        record(self.0.update(args.id, patch).await)
    }
}

pub struct ToggleTodo(Arc<dyn TodoStore>);

#[async_trait]
impl Tool for ToggleTodo {
    fn name(&self) -> &str {
        "toggle_todo"
    }

    fn description(&self) -> &str {
        "Flip a todo item between pending and completed"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "id": id_schema() },
            "required": ["id"]
        })
    }

    async fn call(&self, args: Value) -> Value {
        let IdArgs { id } = match parse_args(args) {
            Ok(args) => args,
            Err(e) => return e,
        };
        let current = match self.0.get(id).await {
            Ok(Some(todo)) => todo,
            Ok(None) => return error_value(TodoError::NotFound(id).to_string()),
            Err(e) => return error_value(e.to_string()),
        };
        record(
            self.0
                .update(id, TodoPatch::status(current.status.toggled()))
                .await,
        )
    }
}

pub struct DeleteTodo(Arc<dyn TodoStore>);

#[async_trait]
impl Tool for DeleteTodo {
    fn name(&self) -> &str {
        "delete_todo"
    }

    fn description(&self) -> &str {
        "Delete a todo item by id"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "id": id_schema() },
            "required": ["id"]
        })
    }

    async fn call(&self, args: Value) -> Value {
        let IdArgs { id } = match parse_args(args) {
            Ok(args) => args,
            Err(e) => return e,
        };
        match self.0.delete(id).await {
            Ok(true) => json!({ "success": true, "id": id }),
            Ok(false) => error_value(TodoError::NotFound(id).to_string()),
            Err(e) => error_value(e.to_string()),
        }
    }
}
