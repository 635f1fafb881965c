use crate::todo::TodoStatus;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static COMMAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(CREATE|UPDATE|COMPLETE|DELETE|LIST|GET|UNKNOWN):\s*(.*)$")
        .expect("command pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Title(String),
    Description(String),
    Completed(bool),
    Status(TodoStatus),
    /// A field name the store has no column for. Dispatching it is a no-op.
    Unsupported { field: String, value: String },
}

impl FieldChange {
    pub fn field_name(&self) -> &str {
        match self {
            FieldChange::Title(_) => "title",
            FieldChange::Description(_) => "description",
            FieldChange::Completed(_) => "completed",
            FieldChange::Status(_) => "status",
            FieldChange::Unsupported { field, .. } => field,
        }
    }

    pub fn value_text(&self) -> String {
        match self {
            FieldChange::Title(v) | FieldChange::Description(v) => v.clone(),
            FieldChange::Completed(done) => done.to_string(),
            FieldChange::Status(status) => status.to_string(),
            FieldChange::Unsupported { value, .. } => value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create { title: String, description: String },
    Update { id: i64, change: FieldChange },
    SetCompletion { id: i64, completed: bool },
    Delete { id: i64 },
    List { status: Option<TodoStatus> },
    Get { id: i64 },
    Unknown { explanation: String },
}

/// A reply that matched the grammar but whose parameters are invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid {command} format: expected {expected} field(s) separated by '|', got {found}.")]
    FieldCount {
        command: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("Invalid todo id '{token}' in {command} command.")]
    InvalidId { command: &'static str, token: String },

    #[error("A todo needs a non-empty title.")]
    EmptyTitle,

    #[error("Invalid status '{0}'. Use 'pending' or 'completed'.")]
    InvalidStatus(String),
}

/// Parses a model reply of the form `KEYWORD: params` into an [`Intent`].
///
/// ```text
/// CREATE: <title> | <description>
/// UPDATE: <id> | <field> | <new_value>
/// COMPLETE: <id> | <true/false>
/// DELETE: <id>
/// LIST: [pending|completed]
/// GET: <id>
/// UNKNOWN: <explanation>
/// ```
///
/// Replies that do not follow the grammar at all become
/// [`Intent::Unknown`] carrying the whole reply, so the user can see what
/// the model said.
pub fn parse_reply(reply: &str) -> Result<Intent, ParseError> {
    let Some(caps) = COMMAND_PATTERN.captures(reply.trim_start()) else {
        return Ok(Intent::Unknown {
            explanation: reply.to_string(),
        });
    };

    let params = caps.get(2).map_or("", |m| m.as_str()).trim();

    match &caps[1] {
        "CREATE" => parse_create(params),
        "UPDATE" => parse_update(params),
        "COMPLETE" => parse_complete(params),
        "DELETE" => Ok(Intent::Delete {
            id: parse_id("DELETE", params)?,
        }),
        "GET" => Ok(Intent::Get {
            id: parse_id("GET", params)?,
        }),
        "LIST" => Ok(parse_list(params)),
        _ => Ok(Intent::Unknown {
            explanation: params.to_string(),
        }),
    }
}

fn parse_id(command: &'static str, token: &str) -> Result<i64, ParseError> {
    let token = token.trim();
    token
        .trim_start_matches('#')
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidId {
            command,
            token: token.to_string(),
        })
}

fn parse_flag(token: &str) -> bool {
    token.trim().eq_ignore_ascii_case("true")
}

fn parse_status(token: &str) -> Result<TodoStatus, ParseError> {
    token
        .parse::<TodoStatus>()
        .map_err(|_| ParseError::InvalidStatus(token.trim().to_string()))
}

fn parse_create(params: &str) -> Result<Intent, ParseError> {
    let mut parts = params.splitn(2, '|');
    let title = parts.next().unwrap_or_default().trim();
    let description = parts.next().unwrap_or_default().trim();

    if title.is_empty() {
        return Err(ParseError::EmptyTitle);
    }

    Ok(Intent::Create {
        title: title.to_string(),
        description: description.to_string(),
    })
}

fn parse_update(params: &str) -> Result<Intent, ParseError> {
    let parts: Vec<&str> = params.split('|').map(str::trim).collect();
    let [id, field, value] = parts[..] else {
        return Err(ParseError::FieldCount {
            command: "UPDATE",
            expected: "3",
            found: parts.len(),
        });
    };

    let id = parse_id("UPDATE", id)?;
    let change = match field.to_lowercase().as_str() {
        "title" if value.is_empty() => return Err(ParseError::EmptyTitle),
        "title" => FieldChange::Title(value.to_string()),
        "description" => FieldChange::Description(value.to_string()),
        "completed" => FieldChange::Completed(parse_flag(value)),
        "status" => FieldChange::Status(parse_status(value)?),
        _ => FieldChange::Unsupported {
            field: field.to_string(),
            value: value.to_string(),
        },
    };

    Ok(Intent::Update { id, change })
}

fn parse_complete(params: &str) -> Result<Intent, ParseError> {
    let parts: Vec<&str> = params.split('|').collect();
    let [id, flag] = parts[..] else {
        return Err(ParseError::FieldCount {
            command: "COMPLETE",
            expected: "2",
            found: parts.len(),
        });
    };

    Ok(Intent::SetCompletion {
        id: parse_id("COMPLETE", id)?,
        completed: parse_flag(flag),
    })
}

/// Only a leading `pending` or `completed` filters; anything else the
/// model wrote after the keyword lists everything.
fn parse_list(params: &str) -> Intent {
    let status = params
        .split_whitespace()
        .next()
        .map(|word| word.trim_end_matches(|c: char| !c.is_alphanumeric()))
        .and_then(|word| word.parse::<TodoStatus>().ok());
    Intent::List { status }
}
