//! One-shot calls to an OpenAI-compatible chat completion endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{settings::Settings, task::Task};

const SYSTEM_PROMPT: &str = "You are a helpful assistant providing task suggestions.";
const MAX_TOKENS: u32 = 50;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("upstream returned no suggestion text")]
    EmptyCompletion,
}

/// Builds the prompt for a task and asks the completion service for one
/// suggestion. Cloneable (the reqwest client is an Arc inside).
#[derive(Clone)]
pub struct SuggestionGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl SuggestionGenerator {
    pub fn new(settings: &Settings, api_key: String) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.completion_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                settings.completion_base_url.trim_end_matches('/')
            ),
            model: settings.completion_model.clone(),
            api_key,
        })
    }

    pub fn build_prompt(task: &Task) -> String {
        let mut prompt = String::from(
            "Provide one short, actionable suggestion (less than 20 words) to improve or clarify the following task:\n",
        );
        prompt.push_str(&format!("Title: {}\n", task.title));
        if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
            prompt.push_str(&format!("Description: {description}\n"));
        }
        prompt.push_str(&format!("Status: {}\n", task.status));
        prompt.push_str("Suggestion:");
        prompt
    }

    /// Single attempt, no retry. The client timeout bounds the wait.
    #[tracing::instrument(skip(self, task), fields(task_id = task.id))]
    pub async fn generate(&self, task: &Task) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_prompt(task),
                },
            ],
            max_tokens: MAX_TOKENS,
            n: 1,
            temperature: TEMPERATURE,
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let suggestion = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyCompletion)?;

        tracing::debug!(chars = suggestion.len(), "received suggestion");
        Ok(suggestion)
    }
}

// ── Wire types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    n: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
