use super::intent::{Intent, ParseError, parse_reply};
use super::prompt::render_interpret_prompt;
use crate::core::error::TodoError;
use crate::providers::LLMProvider;
use crate::todo::Todo;
use thiserror::Error;

pub const CONNECTIVITY_MESSAGE: &str = "Sorry, I couldn't reach the assistant. Please check that the model backend is running and your API key is configured.";

#[derive(Debug, Error)]
pub enum InterpretError {
    /// The backend could not be reached or answered with an error.
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Transport(#[source] TodoError),

    #[error("{0}")]
    Invalid(#[from] ParseError),
}

/// Asks the model to classify `user_text` against the current snapshot.
/// One transport call, no retry.
pub async fn interpret(
    provider: &dyn LLMProvider,
    user_text: &str,
    snapshot: &[Todo],
) -> Result<Intent, InterpretError> {
    let prompt = render_interpret_prompt(user_text, snapshot);
    let reply = provider.complete(&prompt).await.map_err(|e| {
        tracing::warn!(error = %e, "interpretation request failed");
        InterpretError::Transport(e)
    })?;

    tracing::debug!(%reply, "model reply");
    let intent = parse_reply(&reply)?;
    tracing::debug!(?intent, "parsed intent");
    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Role;
    use crate::providers::testing::ScriptedProvider;
    use crate::todo::{TodoStatus, sample};

    #[tokio::test]
    async fn mark_done_becomes_set_completion() {
        let provider = ScriptedProvider::new().reply("COMPLETE: 1 | true");
        let snapshot = vec![sample(1, "Buy milk", "", TodoStatus::Pending)];

        let intent = interpret(&provider, "mark todo 1 done", &snapshot)
            .await
            .unwrap();

        assert_eq!(
            intent,
            Intent::SetCompletion {
                id: 1,
                completed: true
            }
        );
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0][0].role, Role::User);
        assert!(requests[0][0].content.contains("1: Buy milk - No description - Not completed"));
        assert!(requests[0][0].content.contains("USER MESSAGE: \"mark todo 1 done\""));
    }

    #[tokio::test]
    async fn transport_failure_renders_connectivity_message() {
        let provider = ScriptedProvider::new().fail("connection refused");

        let err = interpret(&provider, "hi", &[]).await.unwrap_err();

        assert!(matches!(err, InterpretError::Transport(TodoError::Network(_))));
        assert_eq!(err.to_string(), CONNECTIVITY_MESSAGE);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn malformed_parameters_are_typed_errors() {
        let provider = ScriptedProvider::new().reply("DELETE: the first one");

        let err = interpret(&provider, "delete the first one", &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InterpretError::Invalid(ParseError::InvalidId { .. })
        ));
        assert_eq!(
            err.to_string(),
            "Invalid todo id 'the first one' in DELETE command."
        );
    }

    #[tokio::test]
    async fn free_text_reply_is_preserved() {
        let provider = ScriptedProvider::new().reply("I can't help with the weather.");

        let intent = interpret(&provider, "weather?", &[]).await.unwrap();

        assert_eq!(
            intent,
            Intent::Unknown {
                explanation: "I can't help with the weather.".to_string()
            }
        );
    }
}
