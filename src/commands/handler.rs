use super::ChatState;
use crate::core::error::TodoError;

use console::style;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, TodoError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct ClearCommand;
pub struct ModelCommand;

pub struct HelpCommand {
    lines: Vec<&'static str>,
}

impl HelpCommand {
    pub fn new(lines: Vec<&'static str>) -> Self {
        Self { lines }
    }
}

impl CommandHandler for QuitCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, TodoError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the session (also: exit, quit, q)"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(&self, _state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, TodoError> {
        let mut help_text = vec![style("Available Commands").bold().underlined().to_string()];
        help_text.extend(self.lines.iter().map(|line| style(line).to_string()));
        help_text.push(style(self.help()).to_string());
        help_text.push(String::new());
        help_text.push("Anything else is sent to the assistant, e.g. \"add buy milk\".".to_string());

        Ok(Some(help_text.join("\n")))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(&self, state: &mut ChatState, _args: &[&str]) -> Result<Option<String>, TodoError> {
        let message = if state.assistant.reset() {
            "Conversation history cleared."
        } else {
            "Nothing to clear: each line in this mode is handled on its own."
        };
        Ok(Some(message.to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Clear conversation history"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(&self, state: &mut ChatState, args: &[&str]) -> Result<Option<String>, TodoError> {
        match args.first() {
            None => Ok(Some(format!("Current model: {}", state.assistant.model()))),
            Some(new_model) => {
                state.assistant.set_model(new_model);
                tracing::info!(model = %new_model, "model changed");
                Ok(Some(format!("Model changed to: {}", state.assistant.model())))
            }
        }
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show or change the current model"
    }
}
