use crate::todo::{Todo, render_listing};

const EMPTY_SNAPSHOT: &str = "No todos available.";

/// Builds the interpretation prompt around the current snapshot.
pub fn render_interpret_prompt(user_text: &str, snapshot: &[Todo]) -> String {
    let todos = if snapshot.is_empty() {
        EMPTY_SNAPSHOT.to_string()
    } else {
        render_listing(snapshot)
    };

    format!(
        r#"You are a Todo management assistant. Help the user manage their todo list using natural language commands.

Current Todo Items:
{todos}

Based on the user's message, determine what action they want to take:
1. Create a new todo
2. Update an existing todo
3. Mark a todo as complete/incomplete
4. Delete a todo
5. List todos
6. Get details about a specific todo

Reply with exactly one line in one of these formats and nothing else:
CREATE: <title> | <description>
UPDATE: <id> | <field> | <new_value>
COMPLETE: <id> | <true/false>
DELETE: <id>
LIST: [pending|completed]
GET: <id>
UNKNOWN: <explanation>

Fields that can be updated: title, description, completed, status.

USER MESSAGE: "{message}""#,
        todos = todos,
        message = user_text
    )
}

pub fn render_format_prompt(listing: &str) -> String {
    format!(
        "Please format this todo list in a clean, user-friendly way:\n\n{}",
        listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::{TodoStatus, sample};

    #[test]
    fn empty_snapshot_uses_placeholder() {
        let prompt = render_interpret_prompt("hello", &[]);
        assert!(prompt.contains("Current Todo Items:\nNo todos available.\n"));
        assert!(prompt.ends_with("USER MESSAGE: \"hello\""));
    }

    #[test]
    fn snapshot_lines_are_embedded() {
        let snapshot = vec![
            sample(1, "Buy milk", "", TodoStatus::Pending),
            sample(2, "Call mom", "Sunday", TodoStatus::Completed),
        ];
        let prompt = render_interpret_prompt("mark todo 1 done", &snapshot);

        assert!(prompt.contains("1: Buy milk - No description - Not completed\n"));
        assert!(prompt.contains("2: Call mom - Sunday - Completed\n"));
        assert!(!prompt.contains(EMPTY_SNAPSHOT));
        for keyword in ["CREATE:", "UPDATE:", "COMPLETE:", "DELETE:", "LIST:", "GET:", "UNKNOWN:"] {
            assert!(prompt.contains(keyword), "missing {}", keyword);
        }
    }

    #[test]
    fn braces_in_titles_and_text_are_kept_verbatim() {
        let snapshot = vec![sample(3, "{message}", "", TodoStatus::Pending)];
        let prompt = render_interpret_prompt("add {todos} literally", &snapshot);
        assert!(prompt.contains("3: {message} - No description"));
        assert!(prompt.contains("USER MESSAGE: \"add {todos} literally\""));
    }

    #[test]
    fn format_prompt_wraps_listing() {
        assert_eq!(
            render_format_prompt("1: a - No description - Not completed"),
            "Please format this todo list in a clean, user-friendly way:\n\n1: a - No description - Not completed"
        );
    }
}
