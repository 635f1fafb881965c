use crate::core::error::TodoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    #[default]
    Pending,
    Completed,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TodoStatus::Completed)
    }

    pub fn from_completed(completed: bool) -> Self {
        if completed {
            TodoStatus::Completed
        } else {
            TodoStatus::Pending
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            TodoStatus::Pending => TodoStatus::Completed,
            TodoStatus::Completed => TodoStatus::Pending,
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only `pending` and `completed` are accepted, ignoring case and
/// surrounding whitespace.
impl FromStr for TodoStatus {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TodoStatus::Pending),
            "completed" => Ok(TodoStatus::Completed),
            other => Err(TodoError::InvalidArgument(format!(
                "Invalid status '{}'. Must be 'pending' or 'completed'.",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TodoStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    fn completion_label(&self) -> &'static str {
        if self.is_completed() {
            "Completed"
        } else {
            "Not completed"
        }
    }

    /// One line of the listing embedded in prompts:
    /// `id: title - description - Completed|Not completed`.
    pub fn listing_line(&self) -> String {
        let description = if self.description.is_empty() {
            "No description"
        } else {
            &self.description
        };
        format!(
            "{}: {} - {} - {}",
            self.id,
            self.title,
            description,
            self.completion_label()
        )
    }

    pub fn detail(&self) -> String {
        let description = if self.description.is_empty() {
            "None"
        } else {
            &self.description
        };
        format!(
            "Todo #{}: {}\nDescription: {}\nStatus: {}",
            self.id,
            self.title,
            description,
            self.completion_label()
        )
    }
}

/// Renders the snapshot the way the interpreter prompt and the list
/// reformatting pass expect it. Empty input renders as an empty string.
pub fn render_listing(todos: &[Todo]) -> String {
    todos
        .iter()
        .map(Todo::listing_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Partial update. Fields left as `None` are not touched; the store stamps
/// `updated_at` itself.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    pub fn status(status: TodoStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = description.clone();
        }
        if let Some(status) = self.status {
            todo.status = status;
        }
    }
}

#[cfg(test)]
pub(crate) fn sample(id: i64, title: &str, description: &str, status: TodoStatus) -> Todo {
    let now = Utc::now();
    Todo {
        id,
        title: title.to_string(),
        description: description.to_string(),
        status,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_strict() {
        assert_eq!("pending".parse::<TodoStatus>().unwrap(), TodoStatus::Pending);
        assert_eq!(
            " Completed ".parse::<TodoStatus>().unwrap(),
            TodoStatus::Completed
        );
        assert!("done".parse::<TodoStatus>().is_err());
        assert!("".parse::<TodoStatus>().is_err());
    }

    #[test]
    fn listing_line_uses_placeholders() {
        let todo = sample(1, "Buy milk", "", TodoStatus::Pending);
        assert_eq!(
            todo.listing_line(),
            "1: Buy milk - No description - Not completed"
        );

        let todo = sample(2, "Call mom", "Sunday", TodoStatus::Completed);
        assert_eq!(todo.listing_line(), "2: Call mom - Sunday - Completed");
    }

    #[test]
    fn detail_shows_none_for_empty_description() {
        let todo = sample(7, "Buy milk", "", TodoStatus::Pending);
        assert_eq!(
            todo.detail(),
            "Todo #7: Buy milk\nDescription: None\nStatus: Not completed"
        );
    }

    #[test]
    fn render_listing_joins_lines() {
        let todos = vec![
            sample(1, "A", "", TodoStatus::Pending),
            sample(2, "B", "x", TodoStatus::Completed),
        ];
        assert_eq!(
            render_listing(&todos),
            "1: A - No description - Not completed\n2: B - x - Completed"
        );
        assert_eq!(render_listing(&[]), "");
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut todo = sample(1, "A", "keep", TodoStatus::Pending);
        TodoPatch::status(TodoStatus::Completed).apply_to(&mut todo);
        assert_eq!(todo.title, "A");
        assert_eq!(todo.description, "keep");
        assert!(todo.is_completed());
        assert!(TodoPatch::default().is_empty());
    }
}
