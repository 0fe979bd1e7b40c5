use std::time::{Duration, Instant};

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret as _;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

/// A hosted text-completion model. No output schema is enforced here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Chat-completions client for any OpenAI-compatible endpoint (Gemini by default).
pub struct OpenAiCompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.llm_api_key.expose_secret())
            .with_api_base(config.llm_api_base.as_str());

        Self {
            client: Client::with_config(openai_config),
            model: config.llm_model.clone(),
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let request = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let started = Instant::now();
        let body: ChatCompletionBody =
            tokio::time::timeout(self.timeout, self.client.chat().create_byot(request))
                .await
                .map_err(|_| {
                    AppError::GenerationFailed(format!(
                        "Model call timed out after {}s",
                        self.timeout.as_secs()
                    ))
                })?
                .map_err(|e| {
                    log::error!("Model call to {} failed: {}", self.model, e);
                    AppError::GenerationFailed(format!("Model call failed: {}", e))
                })?;

        log::info!(
            "Model {} responded in {} ms",
            self.model,
            started.elapsed().as_millis()
        );

        completion_text(body)
    }
}

fn completion_text(body: ChatCompletionBody) -> AppResult<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::GenerationFailed("Model returned no content".to_string()))
}
