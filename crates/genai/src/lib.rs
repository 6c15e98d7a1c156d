//! Generative-AI collaborator: a chat-completions call constrained to the
//! healthcare domain by a fixed system instruction.
//!
//! Failures never escape the trait boundary. Auth problems, rate limits,
//! timeouts, server errors and malformed payloads all come back as `None`;
//! the orchestrator substitutes a canned fallback so the turn stays
//! answerable without the backend.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::warn;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 500;

/// Fixed system instruction sent with every generative call. Low
/// temperature keeps replies deterministic-leaning; the instruction is the
/// first filtering layer, the response validator is the second.
pub const SYSTEM_INSTRUCTION: &str = "You are a healthcare AI assistant. Only respond to \
healthcare-related queries. If a question is not about health, medicine, wellness or \
healthcare services, reply exactly: Sorry, I can only assist with healthcare-related \
queries. Keep answers factual, cautious, and recommend consulting a qualified healthcare \
professional for diagnosis or treatment decisions.";

pub trait ReplyGenerator: Send + Sync {
    /// Returns generated text, or `None` when the backend produced nothing
    /// usable.
    async fn generate(&self, utterance: &str) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build generative HTTP client")?;

        Ok(Self { client, api_key })
    }

    async fn complete(&self, utterance: &str) -> Result<String> {
        let payload = json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": utterance }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS
        });

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(self.api_key.as_str())
            .json(&payload)
            .send()
            .await
            .context("generative request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("generative backend returned status {}", status.as_u16());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("generative response parse failed")?;

        extract_completion_text(&body)
            .filter(|text| !text.trim().is_empty())
            .context("generative output text missing")
    }
}

impl ReplyGenerator for OpenAiGenerator {
    async fn generate(&self, utterance: &str) -> Option<String> {
        match self.complete(utterance).await {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(error = %error, "generative call degraded to absent text");
                None
            }
        }
    }
}

/// First-choice message content from a chat-completions payload.
fn extract_completion_text(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|text| text.trim().to_string())
}

/// Stand-in used when no API key is configured; the orchestrator's canned
/// fallbacks cover for it.
#[derive(Debug, Clone, Default)]
pub struct DisabledGenerator;

impl ReplyGenerator for DisabledGenerator {
    async fn generate(&self, _utterance: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub enum Generator {
    OpenAi(OpenAiGenerator),
    Disabled(DisabledGenerator),
}

impl Generator {
    pub fn from_api_key(api_key: Option<String>) -> Result<Self> {
        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => Ok(Self::OpenAi(OpenAiGenerator::new(key)?)),
            None => Ok(Self::Disabled(DisabledGenerator)),
        }
    }
}

impl ReplyGenerator for Generator {
    async fn generate(&self, utterance: &str) -> Option<String> {
        match self {
            Generator::OpenAi(generator) => generator.generate(utterance).await,
            Generator::Disabled(generator) => generator.generate(utterance).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_generator_yields_absent_text() {
        assert_eq!(DisabledGenerator.generate("I have a headache").await, None);
    }

    #[test]
    fn missing_key_builds_disabled_variant() {
        assert!(matches!(
            Generator::from_api_key(None).unwrap(),
            Generator::Disabled(_)
        ));
    }

    #[test]
    fn completion_text_is_extracted_and_trimmed() {
        let payload = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Try resting.  " } }
            ]
        });
        assert_eq!(
            extract_completion_text(&payload).as_deref(),
            Some("Try resting.")
        );
    }

    #[test]
    fn malformed_payload_yields_nothing() {
        assert_eq!(extract_completion_text(&json!({ "choices": [] })), None);
        assert_eq!(extract_completion_text(&json!({})), None);
    }
}
