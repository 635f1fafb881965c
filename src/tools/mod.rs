pub mod call;
pub mod todo;

pub use call::extract_tool_call;
pub use todo::todo_tools;

use crate::core::error::TodoError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A named operation the model can invoke with JSON arguments.
///
/// Tools never fail at the call level: problems are reported in the
/// returned value as `{"error": "..."}`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the argument object.
    fn parameters_schema(&self) -> Value;
    async fn call(&self, args: Value) -> Value;
}

pub struct ToolSet {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tools, ordered by name.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    pub async fn call_tool(&self, name: &str, args: Value) -> Result<Value, TodoError> {
        let tool = self
            .get_tool(name)
            .ok_or_else(|| TodoError::ToolNotFound(name.to_string()))?;
        tracing::debug!(tool = name, %args, "calling tool");
        Ok(tool.call(args).await)
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

pub fn error_value(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

pub fn is_error_value(value: &Value) -> bool {
    value.get("error").is_some()
}

/// Deserializes tool arguments, treating a missing argument object as `{}`.
fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, Value> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| error_value(format!("Invalid arguments: {}", e)))
}
