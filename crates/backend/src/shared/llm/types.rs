use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибки LLM провайдера
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Assistant run {status}: {message}")]
    RunFailed { status: String, message: String },

    #[error("Assistant run did not finish after {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("Empty response from assistant")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::ApiError(format!("Failed to decode response: {}", e))
        } else {
            LlmError::NetworkError(e.to_string())
        }
    }
}

/// Роль сообщения в чате
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Сообщение чата
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Ответ от LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub tokens_used: Option<i32>,
    pub model: String,
    pub finish_reason: Option<String>,
    /// Тред ассистента, в котором получен ответ
    pub thread_id: Option<String>,
}

/// Трейт для LLM провайдеров
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Отправка запроса; `thread_id` продолжает существующий тред, если провайдер их поддерживает
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        thread_id: Option<&str>,
    ) -> Result<LlmResponse, LlmError>;

    /// Тест подключения к провайдеру
    async fn test_connection(&self) -> Result<(), LlmError>;

    /// Получить название провайдера
    fn provider_name(&self) -> &str;

    /// Помнит ли провайдер контекст треда между запросами
    fn keeps_thread_context(&self) -> bool;
}
