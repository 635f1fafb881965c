use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

static TOOL_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""tool"\s*:\s*"([^"]+)""#).expect("tool pattern compiles"));

/// A tool invocation found in a model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

/// Looks for `{"tool": "...", "arguments": {...}}` in a reply, either as the
/// whole reply, inside a fenced code block, or as the outermost braces.
pub fn extract_tool_call(message: &str) -> Option<ToolCall> {
    if !TOOL_FIELD.is_match(message) {
        return None;
    }

    let value = candidates(message)
        .into_iter()
        .find_map(|text| serde_json::from_str::<Value>(text.trim()).ok())?;

    let name = value.get("tool")?.as_str()?.to_string();
    let arguments = value
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    Some(ToolCall { name, arguments })
}

fn candidates(message: &str) -> Vec<&str> {
    let mut found = vec![message];

    for fence in ["```json", "```"] {
        if let Some(start) = message.find(fence) {
            let body = &message[start + fence.len()..];
            if let Some(end) = body.find("```") {
                found.push(&body[..end]);
            }
        }
    }

    if let (Some(start), Some(end)) = (message.find('{'), message.rfind('}')) {
        if start < end {
            found.push(&message[start..=end]);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_reply() {
        let call = extract_tool_call(r#"{"tool": "get_todo", "arguments": {"id": 2}}"#).unwrap();
        assert_eq!(call.name, "get_todo");
        assert_eq!(call.arguments, json!({ "id": 2 }));
    }

    #[test]
    fn fenced_block_with_prose() {
        let reply = "Let me add that.\n```json\n{\"tool\": \"add_todo\", \"arguments\": {\"title\": \"Buy milk\"}}\n```\nDone soon.";
        let call = extract_tool_call(reply).unwrap();
        assert_eq!(call.name, "add_todo");
        assert_eq!(call.arguments["title"], "Buy milk");
    }

    #[test]
    fn embedded_object_without_fence() {
        let reply = r#"Calling {"tool": "list_todos"} now"#;
        let call = extract_tool_call(reply).unwrap();
        assert_eq!(call.name, "list_todos");
        assert_eq!(call.arguments, json!({}));
    }

    #[test]
    fn plain_text_has_no_call() {
        assert!(extract_tool_call("You have two todos left.").is_none());
        assert!(extract_tool_call(r#"the "tool" field is { broken"#).is_none());
    }
}
