use super::Assistant;
use super::interpreter::CONNECTIVITY_MESSAGE;
use crate::providers::{LLMProvider, Message};
use crate::tools::{ToolSet, error_value, extract_tool_call};
use async_trait::async_trait;
use std::sync::Arc;

/// Tool calls executed per user turn before giving up on a final answer.
const MAX_TOOL_ROUNDS: usize = 5;

/// Conversational assistant that lets the model call the todo tools
/// directly, keeping the chat history between turns.
pub struct ToolAssistant {
    provider: Box<dyn LLMProvider>,
    tools: Arc<ToolSet>,
    system_prompt: String,
    history: Vec<Message>,
}

impl ToolAssistant {
    pub fn new(provider: Box<dyn LLMProvider>, tools: Arc<ToolSet>) -> Self {
        let system_prompt = build_system_prompt(&tools);
        Self {
            provider,
            tools,
            system_prompt,
            history: Vec::new(),
        }
    }

    fn request(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend(self.history.iter().cloned());
        messages
    }
}

fn build_system_prompt(tools: &ToolSet) -> String {
    let mut prompt = String::from(
        "You are a todo list assistant. You manage the user's todos only through the tools below.\n\nAvailable tools:\n",
    );
    for tool in tools.tools() {
        prompt.push_str(&format!(
            "- {}: {}\n  arguments schema: {}\n",
            tool.name(),
            tool.description(),
            tool.parameters_schema()
        ));
    }
    prompt.push_str(
        "\nTo use a tool, reply with only a JSON object of this form:\n\
         {\"tool\": \"tool_name\", \"arguments\": {\"param\": \"value\"}}\n\
         You will receive the result in the next message. Call one tool at a time. \
         When you have what you need, answer the user in plain language.",
    );
    prompt
}

#[async_trait]
impl Assistant for ToolAssistant {
    async fn respond(&mut self, input: &str) -> String {
        let checkpoint = self.history.len();
        self.history.push(Message::user(input));
        let mut rounds = 0;

        loop {
            let reply = match self.provider.get_response(&self.request()).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(error = %e, "tool chat request failed");
                    self.history.truncate(checkpoint);
                    return CONNECTIVITY_MESSAGE.to_string();
                }
            };
            self.history.push(Message::assistant(reply.clone()));

            let Some(call) = extract_tool_call(&reply) else {
                return reply;
            };
            if rounds == MAX_TOOL_ROUNDS {
                tracing::warn!(rounds, "tool round limit reached");
                let stopped = format!(
                    "Stopped after {} tool calls without a final answer.",
                    MAX_TOOL_ROUNDS
                );
                // the unanswered call must not open the next turn
                self.history.pop();
                self.history.push(Message::assistant(stopped.clone()));
                return stopped;
            }
            rounds += 1;

            tracing::info!(tool = %call.name, "model requested tool");
            let result = self
                .tools
                .call_tool(&call.name, call.arguments)
                .await
                .unwrap_or_else(|e| error_value(e.to_string()));
            let rendered = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
            self.history
                .push(Message::user(format!("Tool call result: {}", rendered)));
        }
    }

    fn set_model(&mut self, model: &str) {
        self.provider.set_model(model);
    }

    fn model(&self) -> &str {
        self.provider.model()
    }

    fn reset(&mut self) -> bool {
        self.history.clear();
        true
    }
}
