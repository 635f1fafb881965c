use crate::todo::{NewTodo, Todo, TodoPatch, TodoStatus};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as SerdeError};

/// A todo as the REST API sends it. Status travels as a boolean
/// `completed`; everything past this module uses [`TodoStatus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTodo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for ApiTodo {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: if todo.description.is_empty() {
                None
            } else {
                Some(todo.description)
            },
            completed: todo.status.is_completed(),
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

impl From<ApiTodo> for Todo {
    fn from(api: ApiTodo) -> Self {
        Self {
            id: api.id,
            title: api.title,
            description: api.description.unwrap_or_default(),
            status: TodoStatus::from_completed(api.completed),
            created_at: api.created_at,
            updated_at: api.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTodoCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<NewTodo> for ApiTodoCreate {
    fn from(new: NewTodo) -> Self {
        Self {
            title: new.title,
            description: Some(new.description),
        }
    }
}

impl From<ApiTodoCreate> for NewTodo {
    fn from(body: ApiTodoCreate) -> Self {
        NewTodo::new(body.title, body.description.unwrap_or_default())
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ApiTodoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl From<TodoPatch> for ApiTodoUpdate {
    fn from(patch: TodoPatch) -> Self {
        Self {
            title: patch.title,
            description: patch.description,
            completed: patch.status.map(|s| s.is_completed()),
        }
    }
}

impl From<ApiTodoUpdate> for TodoPatch {
    fn from(body: ApiTodoUpdate) -> Self {
        Self {
            title: body.title,
            description: body.description,
            status: body.completed.map(TodoStatus::from_completed),
        }
    }
}

/// Accepts RFC 3339 and naive ISO-8601 timestamps; naive values are UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| SerdeError::custom(format!("invalid timestamp '{}': {}", raw, e)))
}
