use crate::config::{Provider, ProviderConfig};
use crate::core::error::TodoError;
use crate::providers::{
    LLMProvider, anthropic::AnthropicProvider, gemini::GeminiProvider,
    openai_compatible::OpenAICompatibleProvider,
};
use std::collections::HashMap;
use std::time::Duration;

/// Resolved connection settings handed to a creator.
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn resolve(provider: Provider, config: &ProviderConfig, timeout: Duration) -> Self {
        let api_key = config.resolved_api_key(provider);
        if api_key.is_none() {
            tracing::warn!(
                "no API key configured for {:?}; set {} or add it to the config file",
                provider,
                provider.api_key_env()
            );
        }

        Self {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| provider.default_base_url().to_string()),
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| provider.default_model().to_string()),
            timeout,
        }
    }
}

type CreatorResult = Result<Box<dyn LLMProvider>, TodoError>;
type ProviderCreator = Box<dyn Fn(ProviderSettings) -> CreatorResult + Send + Sync>;

pub struct ProviderFactory {
    creators: HashMap<Provider, ProviderCreator>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        let mut creators: HashMap<Provider, ProviderCreator> = HashMap::new();

        let chat_completions = |s: ProviderSettings| -> CreatorResult {
            let provider =
                OpenAICompatibleProvider::new(s.base_url, s.api_key, s.model, None, s.timeout)?;
            Ok(Box::new(provider) as Box<dyn LLMProvider>)
        };
        creators.insert(Provider::OpenAI, Box::new(chat_completions));
        creators.insert(Provider::DeepSeek, Box::new(chat_completions));

        creators.insert(
            Provider::OpenRouter,
            Box::new(|s: ProviderSettings| -> CreatorResult {
                let mut headers = HashMap::new();
                headers.insert("X-Title".to_string(), "todochat".to_string());
                let provider = OpenAICompatibleProvider::new(
                    s.base_url,
                    s.api_key,
                    s.model,
                    Some(headers),
                    s.timeout,
                )?;
                Ok(Box::new(provider) as Box<dyn LLMProvider>)
            }),
        );

        creators.insert(
            Provider::Anthropic,
            Box::new(|s: ProviderSettings| -> CreatorResult {
                let provider = AnthropicProvider::new(s.base_url, s.api_key, s.model, s.timeout)?;
                Ok(Box::new(provider) as Box<dyn LLMProvider>)
            }),
        );

        creators.insert(
            Provider::Gemini,
            Box::new(|s: ProviderSettings| -> CreatorResult {
                let provider = GeminiProvider::new(s.base_url, s.api_key, s.model, s.timeout)?;
                Ok(Box::new(provider) as Box<dyn LLMProvider>)
            }),
        );

        Self { creators }
    }

    pub fn create(
        &self,
        provider: Provider,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn LLMProvider>, TodoError> {
        let creator = self
            .creators
            .get(&provider)
            .ok_or_else(|| TodoError::Config(format!("Provider not found: {:?}", provider)))?;
        creator(ProviderSettings::resolve(provider, config, timeout))
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}
