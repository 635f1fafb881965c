use crate::commands::CommandDispatcher;
use crate::config::Config;
use crate::core::error::TodoError;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as EditorConfig, Context, EditMode, Editor, Helper};
use std::borrow::Cow;
use std::fs;

pub type TodoEditor = Editor<TodoHelper, FileHistory>;

/// What one read from the prompt produced.
#[derive(Debug, PartialEq, Eq)]
pub enum UserInput {
    Line(String),
    Command(String),
    Exit,
}

/// Classifies a raw line. Blank lines yield `None`.
pub fn classify(line: &str) -> Option<UserInput> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if ["exit", "quit", "q"]
        .iter()
        .any(|word| line.eq_ignore_ascii_case(word))
    {
        return Some(UserInput::Exit);
    }
    if line.starts_with('/') {
        return Some(UserInput::Command(line.to_string()));
    }
    Some(UserInput::Line(line.to_string()))
}

/// Completes slash commands and hints from history.
pub struct TodoHelper {
    commands: CommandDispatcher,
    hinter: HistoryHinter,
}

impl TodoHelper {
    pub fn new(commands: CommandDispatcher) -> Self {
        Self {
            commands,
            hinter: HistoryHinter {},
        }
    }

    fn command_candidates(&self, typed: &str) -> Vec<Pair> {
        self.commands
            .get_command_names()
            .into_iter()
            .filter(|name| name.starts_with(typed))
            .map(|name| Pair {
                display: format!("/{}", name),
                replacement: name,
            })
            .collect()
    }
}

impl Helper for TodoHelper {}

impl Completer for TodoHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        match line.get(..pos) {
            Some(typed) if typed.starts_with('/') && !typed.contains(' ') => {
                Ok((1, self.command_candidates(&typed[1..])))
            }
            _ => Ok((pos, Vec::new())),
        }
    }
}

impl Hinter for TodoHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for TodoHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }
}

impl Validator for TodoHelper {}

pub fn create_editor(commands: CommandDispatcher) -> Result<TodoEditor, TodoError> {
    let config = EditorConfig::builder()
        .history_ignore_space(true)
        .history_ignore_dups(true)
        .map_err(|e| TodoError::Input(format!("Invalid editor configuration: {}", e)))?
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| TodoError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(TodoHelper::new(commands)));

    let history_path = Config::history_path();
    if editor.load_history(&history_path).is_err() {
        tracing::debug!(path = %history_path.display(), "no input history yet");
    }

    Ok(editor)
}

/// Reads one line. Ctrl-C and Ctrl-D end the session.
pub fn read_input(editor: &mut TodoEditor) -> Result<UserInput, TodoError> {
    let prompt = style("todo> ").bold().cyan().to_string();
    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let Some(input) = classify(&line) else {
                    continue;
                };
                if let Err(e) = editor.add_history_entry(line.trim()) {
                    tracing::debug!(error = %e, "could not record history entry");
                }
                return Ok(input);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(UserInput::Exit),
            Err(err) => return Err(TodoError::Input(format!("Input error: {}", err))),
        }
    }
}

pub fn save_history(editor: &mut TodoEditor) -> Result<(), TodoError> {
    let history_path = Config::history_path();
    if let Some(parent) = history_path.parent() {
        fs::create_dir_all(parent)?;
    }

    editor
        .save_history(&history_path)
        .map_err(|e| TodoError::Input(format!("Failed to save history: {}", e)))
}
