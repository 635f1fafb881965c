pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::assistant::Assistant;
pub use dispatcher::{CommandDispatcher, create_command_registry};

/// What slash commands may act on during an interactive session.
pub struct ChatState {
    pub assistant: Box<dyn Assistant>,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(assistant: Box<dyn Assistant>) -> Self {
        Self {
            assistant,
            should_continue: true,
        }
    }
}
