#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::LlmConfig;

/// Environment variable holding the chat API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Answer-generation failures are surfaced to the user as readable errors;
/// there is deliberately no retry here, unlike the embedding client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    base_url: Url,
    model: String,
    api_key: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// The single typed response contract: the answer is always the first
/// choice's message content.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl LlmClient {
    /// Build a client from config, reading the API key from `GROQ_API_KEY`.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .with_context(|| format!("{} is not set", API_KEY_ENV))?;

        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &LlmConfig, api_key: String) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid LLM base URL: {}", config.base_url))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.model.clone(),
            api_key,
            agent,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate an answer for the prompt.
    pub fn generate(&self, prompt: &str) -> Result<String> {
        let url = chat_completions_url(&self.base_url)?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize chat request")?;

        debug!(
            "Requesting answer from {} with model {}",
            url, self.model
        );

        let authorization = format!("Bearer {}", self.api_key);
        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .header("Authorization", authorization.as_str())
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| {
                warn!("Chat request failed: {}", e);
                anyhow::anyhow!("Chat request failed: {}", e)
            })?;

        extract_answer(&response_text)
    }
}

/// Join the chat-completions path onto the configured base URL, preserving
/// any path prefix (e.g. `/openai/v1`).
fn chat_completions_url(base_url: &Url) -> Result<Url> {
    let mut url = base_url.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| anyhow::anyhow!("LLM base URL cannot have segments appended"))?;
        segments.pop_if_empty();
        segments.push("chat");
        segments.push("completions");
    }
    Ok(url)
}

/// Decode the response body into the answer text. Decided once, here: the
/// answer is `choices[0].message.content`; an empty choice list is an error.
fn extract_answer(response_text: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(response_text).context("Failed to parse chat response")?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .context("Chat response contained no choices")?;

    Ok(choice.message.content)
}
