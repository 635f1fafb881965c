pub mod dispatcher;
pub mod intent;
pub mod interpreter;
pub mod prompt;
pub mod tool_calling;

pub use dispatcher::Dispatcher;
pub use interpreter::interpret;
pub use tool_calling::ToolAssistant;

use crate::providers::LLMProvider;
use crate::store::TodoStore;
use async_trait::async_trait;
use std::sync::Arc;

/// One conversational front end over the todo store. A turn never fails:
/// every problem comes back as the text to show the user.
#[async_trait]
pub trait Assistant: Send {
    async fn respond(&mut self, input: &str) -> String;

    fn set_model(&mut self, model: &str);

    fn model(&self) -> &str;

    /// Forgets any conversation state. Returns false when the assistant
    /// keeps none.
    fn reset(&mut self) -> bool;
}

/// Interprets each line into a single command and runs it.
pub struct CommandAssistant {
    provider: Box<dyn LLMProvider>,
    store: Arc<dyn TodoStore>,
}

impl CommandAssistant {
    pub fn new(provider: Box<dyn LLMProvider>, store: Arc<dyn TodoStore>) -> Self {
        Self { provider, store }
    }
}

#[async_trait]
impl Assistant for CommandAssistant {
    async fn respond(&mut self, input: &str) -> String {
        let snapshot = match self.store.list(None).await {
            Ok(todos) => todos,
            Err(e) => {
                tracing::error!(error = %e, "could not load todos");
                return format!("Couldn't load your todos: {}", e);
            }
        };

        let intent = match interpret(self.provider.as_ref(), input, &snapshot).await {
            Ok(intent) => intent,
            Err(e) => return e.to_string(),
        };

        Dispatcher::new(self.store.as_ref(), self.provider.as_ref())
            .dispatch(intent, &snapshot)
            .await
            .unwrap_or_else(|e| e.to_string())
    }

    fn set_model(&mut self, model: &str) {
        self.provider.set_model(model);
    }

    fn model(&self) -> &str {
        self.provider.model()
    }

    fn reset(&mut self) -> bool {
        false
    }
}
