use crate::core::error::TodoError;
use crate::providers::base_client::HttpClient;
use crate::providers::{LLMProvider, Message, Role};
use async_trait::async_trait;
use std::time::Duration;

mod types;

use types::*;

#[derive(Clone)]
pub struct GeminiProvider {
    client: HttpClient,
    model: String,
}

impl GeminiProvider {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, TodoError> {
        let mut client = HttpClient::new(base_url, None, None, timeout)?;
        // Gemini authenticates with a query parameter instead of a header
        client.add_query_param("key", api_key.unwrap_or_default());

        Ok(Self { client, model })
    }

    fn build_payload(messages: &[Message]) -> GeminiRequest {
        let system_text = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let contents = messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(GeminiContent {
                    role,
                    parts: vec![GeminiPart {
                        text: Some(m.content.clone()),
                    }],
                })
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction: (!system_text.is_empty()).then(|| SystemInstruction {
                parts: vec![GeminiPart {
                    text: Some(system_text),
                }],
            }),
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn get_response(&self, messages: &[Message]) -> Result<String, TodoError> {
        let payload = Self::build_payload(messages);
        let response = self
            .client
            .post(
                &format!("v1beta/models/{}:generateContent", self.model),
                &payload,
            )
            .await?;

        let response_body = response.text().await?;
        let parsed: GeminiResponse = serde_json::from_str(&response_body)?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().find_map(|p| p.text))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| TodoError::Api("No valid response from Gemini".to_string()))
    }

    fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_to_model_endpoint_with_key_param() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(query_param("key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "GET: 4" }] } }]
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(
            server.uri(),
            Some("g-key".to_string()),
            "gemini-test".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(provider.complete("show 4").await.unwrap(), "GET: 4");
    }

    #[test]
    fn system_messages_become_instruction() {
        let payload = GeminiProvider::build_payload(&[
            Message::system("rules"),
            Message::user("hi"),
            Message::assistant("hello"),
        ]);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["system_instruction"]["parts"][0]["text"], "rules");
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
    }
}
