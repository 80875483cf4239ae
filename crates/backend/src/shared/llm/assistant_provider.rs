use super::types::{ChatMessage, ChatRole, LlmError, LlmProvider, LlmResponse};
use crate::shared::config::LlmConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Провайдер OpenAI Assistants v2
///
/// Каждый запрос выполняется как run на треде ассистента. Тред сохраняется
/// вместе с планом, поэтому доработка плана продолжает тот же диалог.
pub struct AssistantProvider {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    assistant_id: String,
    model: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    last_error: Option<RunLastError>,
    #[serde(default)]
    incomplete_details: Option<serde_json::Value>,
    #[serde(default)]
    usage: Option<RunUsage>,
}

#[derive(Debug, Deserialize)]
struct RunLastError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RunUsage {
    total_tokens: i64,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    role: String,
    #[serde(default)]
    run_id: Option<String>,
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<MessageText>,
}

#[derive(Debug, Deserialize)]
struct MessageText {
    value: String,
}

/// Состояние run с точки зрения цикла опроса
#[derive(Debug, PartialEq, Eq)]
enum RunState {
    Pending,
    Completed,
    Failed,
}

impl RunState {
    fn from_status(status: &str) -> Self {
        match status {
            "queued" | "in_progress" | "cancelling" => RunState::Pending,
            "completed" => RunState::Completed,
            // failed, cancelled, expired, requires_action, incomplete
            _ => RunState::Failed,
        }
    }
}

impl AssistantProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self {
            http,
            api_base: config.api_endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            assistant_id: config.assistant_id.clone(),
            model: config.model_name.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_attempts: config.max_poll_attempts.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    /// Проверить HTTP статус и разобрать тело ответа
    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(LlmError::AuthError(body)),
            429 => Err(LlmError::RateLimitExceeded),
            code => Err(LlmError::ApiError(format!("HTTP {}: {}", code, body))),
        }
    }

    async fn create_thread(&self) -> Result<String, LlmError> {
        let response = self
            .request(reqwest::Method::POST, "/threads")
            .json(&json!({}))
            .send()
            .await?;
        let thread: ThreadObject = Self::read_json(response).await?;
        tracing::debug!("Assistant thread created: {}", thread.id);
        Ok(thread.id)
    }

    async fn add_message(&self, thread_id: &str, message: &ChatMessage) -> Result<(), LlmError> {
        let role = match message.role {
            ChatRole::Assistant => "assistant",
            _ => "user",
        };
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/threads/{}/messages", thread_id),
            )
            .json(&json!({ "role": role, "content": message.content }))
            .send()
            .await?;
        let _: serde_json::Value = Self::read_json(response).await?;
        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &str,
        additional_instructions: Option<String>,
    ) -> Result<RunObject, LlmError> {
        let mut body = json!({ "assistant_id": self.assistant_id });
        if let Some(instructions) = additional_instructions {
            body["additional_instructions"] = json!(instructions);
        }

        let response = self
            .request(reqwest::Method::POST, &format!("/threads/{}/runs", thread_id))
            .json(&body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunObject, LlmError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/threads/{}/runs/{}", thread_id, run_id),
            )
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Опрашивать run до завершения или исчерпания попыток
    async fn wait_for_run(&self, thread_id: &str, run: RunObject) -> Result<RunObject, LlmError> {
        let mut run = run;
        for attempt in 1..=self.max_poll_attempts {
            match RunState::from_status(&run.status) {
                RunState::Completed => return Ok(run),
                RunState::Failed => return Err(Self::run_failure(run)),
                RunState::Pending => {
                    tracing::debug!(
                        "Run {} is {} (poll {}/{})",
                        run.id,
                        run.status,
                        attempt,
                        self.max_poll_attempts
                    );
                    tokio::time::sleep(self.poll_interval).await;
                    run = self.retrieve_run(thread_id, &run.id).await?;
                }
            }
        }

        match RunState::from_status(&run.status) {
            RunState::Completed => Ok(run),
            RunState::Failed => Err(Self::run_failure(run)),
            RunState::Pending => Err(LlmError::Timeout {
                attempts: self.max_poll_attempts,
            }),
        }
    }

    fn run_failure(run: RunObject) -> LlmError {
        let message = match (&run.last_error, &run.incomplete_details) {
            (Some(err), _) if !err.message.is_empty() => {
                if err.code.is_empty() {
                    err.message.clone()
                } else {
                    format!("{}: {}", err.code, err.message)
                }
            }
            (_, Some(details)) => details.to_string(),
            _ => "no error details".to_string(),
        };
        LlmError::RunFailed {
            status: run.status,
            message,
        }
    }

    /// Текст последнего сообщения ассистента, созданного данным run
    async fn latest_reply(&self, thread_id: &str, run_id: &str) -> Result<String, LlmError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/threads/{}/messages", thread_id),
            )
            .query(&[("order", "desc"), ("limit", "10")])
            .send()
            .await?;
        let list: MessageList = Self::read_json(response).await?;

        let reply = list
            .data
            .into_iter()
            .filter(|m| m.role == "assistant")
            .find(|m| m.run_id.as_deref().map_or(true, |id| id == run_id))
            .ok_or(LlmError::EmptyResponse)?;

        let text = reply
            .content
            .into_iter()
            .filter(|c| c.kind == "text")
            .filter_map(|c| c.text.map(|t| t.value))
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for AssistantProvider {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        thread_id: Option<&str>,
    ) -> Result<LlmResponse, LlmError> {
        let (system, conversation): (Vec<ChatMessage>, Vec<ChatMessage>) = messages
            .into_iter()
            .partition(|m| m.role == ChatRole::System);

        if conversation.is_empty() {
            return Err(LlmError::InvalidRequest(
                "At least one user message is required".to_string(),
            ));
        }

        let instructions = if system.is_empty() {
            None
        } else {
            Some(
                system
                    .into_iter()
                    .map(|m| m.content)
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            )
        };

        let thread_id = match thread_id {
            Some(id) => id.to_string(),
            None => self.create_thread().await?,
        };

        for message in &conversation {
            self.add_message(&thread_id, message).await?;
        }

        let run = self.create_run(&thread_id, instructions).await?;
        tracing::info!("Assistant run {} started on thread {}", run.id, thread_id);

        let run = self.wait_for_run(&thread_id, run).await?;
        let content = self.latest_reply(&thread_id, &run.id).await?;

        Ok(LlmResponse {
            content,
            tokens_used: run.usage.as_ref().map(|u| u.total_tokens as i32),
            model: run.model.clone().unwrap_or_else(|| self.model.clone()),
            finish_reason: Some(run.status.clone()),
            thread_id: Some(thread_id),
        })
    }

    async fn test_connection(&self) -> Result<(), LlmError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/assistants/{}", self.assistant_id),
            )
            .send()
            .await?;
        let _: serde_json::Value = Self::read_json(response).await?;
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "OpenAI Assistant"
    }

    fn keeps_thread_context(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_config(base_url: String, max_poll_attempts: u32) -> LlmConfig {
        LlmConfig {
            api_endpoint: base_url,
            api_key: "sk-test".to_string(),
            assistant_id: "asst_123".to_string(),
            poll_interval_ms: 5,
            max_poll_attempts,
            ..LlmConfig::default()
        }
    }

    fn plan_messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are a tour planner"),
            ChatMessage::user("Plan March 2025"),
        ]
    }

    #[test]
    fn test_run_state_mapping() {
        assert_eq!(RunState::from_status("queued"), RunState::Pending);
        assert_eq!(RunState::from_status("in_progress"), RunState::Pending);
        assert_eq!(RunState::from_status("cancelling"), RunState::Pending);
        assert_eq!(RunState::from_status("completed"), RunState::Completed);
        assert_eq!(RunState::from_status("expired"), RunState::Failed);
        assert_eq!(RunState::from_status("requires_action"), RunState::Failed);
        assert_eq!(RunState::from_status("incomplete"), RunState::Failed);
    }

    #[tokio::test]
    async fn test_new_thread_run_completes() {
        let server = MockServer::start_async().await;

        let thread_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/threads")
                    .header("openai-beta", "assistants=v2")
                    .header("authorization", "Bearer sk-test");
                then.status(200).json_body(json!({ "id": "thread_1" }));
            })
            .await;
        let message_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/threads/thread_1/messages");
                then.status(200).json_body(json!({ "id": "msg_1" }));
            })
            .await;
        let run_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/threads/thread_1/runs")
                    .json_body_partial(r#"{"assistant_id": "asst_123"}"#);
                then.status(200)
                    .json_body(json!({ "id": "run_1", "status": "queued" }));
            })
            .await;
        let poll_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/threads/thread_1/runs/run_1");
                then.status(200).json_body(json!({
                    "id": "run_1",
                    "status": "completed",
                    "model": "gpt-4o-mini",
                    "usage": { "prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150 }
                }));
            })
            .await;
        let list_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/threads/thread_1/messages")
                    .query_param("order", "desc");
                then.status(200).json_body(json!({
                    "data": [
                        {
                            "role": "assistant",
                            "run_id": "run_1",
                            "content": [{ "type": "text", "text": { "value": "{\"weekly_targets\": []}" } }]
                        },
                        {
                            "role": "user",
                            "run_id": null,
                            "content": [{ "type": "text", "text": { "value": "Plan March 2025" } }]
                        }
                    ]
                }));
            })
            .await;

        let provider = AssistantProvider::new(&test_config(server.base_url(), 5)).unwrap();
        let response = provider.chat_completion(plan_messages(), None).await.unwrap();

        thread_mock.assert_async().await;
        message_mock.assert_hits_async(1).await;
        run_mock.assert_async().await;
        poll_mock.assert_async().await;
        list_mock.assert_async().await;
        assert_eq!(response.content, "{\"weekly_targets\": []}");
        assert_eq!(response.thread_id.as_deref(), Some("thread_1"));
        assert_eq!(response.tokens_used, Some(150));
        assert_eq!(response.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_existing_thread_is_reused() {
        let server = MockServer::start_async().await;

        let thread_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/threads");
                then.status(200).json_body(json!({ "id": "unexpected" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads/thread_9/messages");
                then.status(200).json_body(json!({ "id": "msg_2" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads/thread_9/runs");
                then.status(200)
                    .json_body(json!({ "id": "run_2", "status": "completed" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/threads/thread_9/messages");
                then.status(200).json_body(json!({
                    "data": [{
                        "role": "assistant",
                        "run_id": "run_2",
                        "content": [{ "type": "text", "text": { "value": "revised" } }]
                    }]
                }));
            })
            .await;

        let provider = AssistantProvider::new(&test_config(server.base_url(), 5)).unwrap();
        let response = provider
            .chat_completion(vec![ChatMessage::user("Move Bandra to week 2")], Some("thread_9"))
            .await
            .unwrap();

        thread_mock.assert_hits_async(0).await;
        assert_eq!(response.content, "revised");
        assert_eq!(response.thread_id.as_deref(), Some("thread_9"));
    }

    #[tokio::test]
    async fn test_failed_run_reports_last_error() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads");
                then.status(200).json_body(json!({ "id": "thread_1" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads/thread_1/messages");
                then.status(200).json_body(json!({ "id": "msg_1" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads/thread_1/runs");
                then.status(200)
                    .json_body(json!({ "id": "run_1", "status": "in_progress" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/threads/thread_1/runs/run_1");
                then.status(200).json_body(json!({
                    "id": "run_1",
                    "status": "failed",
                    "last_error": { "code": "server_error", "message": "boom" }
                }));
            })
            .await;

        let provider = AssistantProvider::new(&test_config(server.base_url(), 5)).unwrap();
        let err = provider
            .chat_completion(plan_messages(), None)
            .await
            .unwrap_err();

        match err {
            LlmError::RunFailed { status, message } => {
                assert_eq!(status, "failed");
                assert_eq!(message, "server_error: boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_that_never_finishes_times_out() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads");
                then.status(200).json_body(json!({ "id": "thread_1" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads/thread_1/messages");
                then.status(200).json_body(json!({ "id": "msg_1" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads/thread_1/runs");
                then.status(200)
                    .json_body(json!({ "id": "run_1", "status": "queued" }));
            })
            .await;
        let poll_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/threads/thread_1/runs/run_1");
                then.status(200)
                    .json_body(json!({ "id": "run_1", "status": "in_progress" }));
            })
            .await;

        let provider = AssistantProvider::new(&test_config(server.base_url(), 3)).unwrap();
        let err = provider
            .chat_completion(plan_messages(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Timeout { attempts: 3 }));
        poll_mock.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn test_http_status_mapping() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/threads");
                then.status(401).body("invalid api key");
            })
            .await;

        let provider = AssistantProvider::new(&test_config(server.base_url(), 3)).unwrap();
        let err = provider
            .chat_completion(plan_messages(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::AuthError(_)));

        let limited = MockServer::start_async().await;
        limited
            .mock_async(|when, then| {
                when.method(POST).path("/threads");
                then.status(429);
            })
            .await;
        let provider = AssistantProvider::new(&test_config(limited.base_url(), 3)).unwrap();
        let err = provider
            .chat_completion(plan_messages(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimitExceeded));
    }
}
