pub mod assistant_provider;
pub mod openai_provider;
pub mod types;

pub use types::*;

use crate::shared::config::LlmConfig;
use assistant_provider::AssistantProvider;
use openai_provider::OpenAiProvider;
use std::sync::Arc;

/// Создать провайдера по настройкам: ассистент, если задан `assistant_id`,
/// иначе обычный chat completion
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    if config.api_key.trim().is_empty() {
        return Err(LlmError::AuthError(
            "OpenAI API key is not configured (llm.api_key or OPENAI_API_KEY)".to_string(),
        ));
    }

    if config.uses_assistant() {
        tracing::info!("Using OpenAI assistant {}", config.assistant_id);
        Ok(Arc::new(AssistantProvider::new(config)?))
    } else {
        tracing::info!("Using OpenAI chat completion ({})", config.model_name);
        Ok(Arc::new(OpenAiProvider::new_with_endpoint(
            config.api_endpoint.clone(),
            config.api_key.clone(),
            config.model_name.clone(),
            config.temperature,
            config.max_tokens,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_provider_selects_by_assistant_id() {
        let mut config = LlmConfig {
            api_key: "sk-test".to_string(),
            ..LlmConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert!(!provider.keeps_thread_context());

        config.assistant_id = "asst_1".to_string();
        let provider = build_provider(&config).unwrap();
        assert!(provider.keeps_thread_context());
        assert_eq!(provider.provider_name(), "OpenAI Assistant");
    }

    #[test]
    fn test_build_provider_requires_key() {
        let config = LlmConfig::default();
        assert!(matches!(
            build_provider(&config),
            Err(LlmError::AuthError(_))
        ));
    }
}
