//! Chat-completions client that asks a model for form schemas

use crate::error::GenerationError;
use crate::extract::{extract_content, strip_code_fences};
use crate::Generator;
use async_trait::async_trait;
use schemaeval_core::PromptRecord;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api.llama.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "Llama-4-Maverick-17B-128E-Instruct-FP8";

/// Instructions sent as the system message of every request
pub const SYSTEM_PROMPT: &str = r#"You design database schemas for a no-code platform. Produce every form schema the user's project needs in a single response.

Return a single JSON object when one schema is enough, otherwise a JSON array of objects. Every schema in the response carries the same "appsId".

Schema shape:
{
  "appsId": "CamelCaseAppName",
  "formId": "FormName",
  "description": "What this form represents",
  "fields": {
    "fieldName": {
      "fieldId": "fieldName",
      "fieldType": "TEXT | NUMERIC | BOOLEAN | MONEY | DATE | REF_PICK_LIST | EMBED",
      "required": false,
      "unique": false,
      "default": null,
      "allowMultiple": false,
      "refPickListId": "FormName.fieldId",
      "fractionDigits": 2,
      "currencyCode": "USD",
      "embeddedFormSchema": { "fields": { } }
    }
  }
}

Rules:
- "appsId" is always present and written in CamelCase; never emit a "name" key in its place.
- Each key of "fields" equals the "fieldId" it holds.
- REF_PICK_LIST fields set "refPickListId" as "FormName.fieldId".
- MONEY fields set both "fractionDigits" and "currencyCode".
- EMBED fields set "embeddedFormSchema" with nested fields.
- Use "required", not "isRequired".
- Reply with the JSON only, no prose."#;

/// Connection and retry settings for the generation endpoint
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    /// Upper bound for a single attempt
    pub timeout: Duration,
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// Delay before retry `n` is `retry_backoff * n`
    pub retry_backoff: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            max_tokens: 1024,
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl GeneratorConfig {
    /// Worst-case wall time of one `generate` call: every attempt plus every backoff
    pub fn deadline(&self) -> Duration {
        let attempts = self.max_retries + 1;
        let backoff_steps = self.max_retries * (self.max_retries + 1) / 2;
        self.timeout * attempts + self.retry_backoff * backoff_steps
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    fn new(config: &'a GeneratorConfig, prompt: &'a str) -> Self {
        Self {
            model: &config.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens: config.max_tokens,
        }
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    config: GeneratorConfig,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config, api_key })
    }

    async fn attempt(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest::new(&self.config, prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status: status.as_u16(), body });
        }

        let data: Value = response.json().await?;
        let content = extract_content(&data).ok_or(GenerationError::EmptyContent)?;
        Ok(strip_code_fences(&content).to_string())
    }
}

#[async_trait]
impl Generator for ChatCompletionsClient {
    fn name(&self) -> &'static str {
        "chat-completions"
    }

    async fn generate(&self, prompt: &PromptRecord) -> Result<String, GenerationError> {
        let mut attempt = 0u32;
        loop {
            let started = Instant::now();
            let outcome = match tokio::time::timeout(self.config.timeout, self.attempt(&prompt.prompt)).await {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout(started.elapsed().as_millis())),
            };

            match outcome {
                Ok(content) => {
                    debug!("[{}] generated {} bytes on attempt {}", prompt.id, content.len(), attempt + 1);
                    return Ok(content);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!("[{}] generation attempt {} failed: {}; retrying", prompt.id, attempt, e);
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
