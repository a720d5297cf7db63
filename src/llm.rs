//! OpenAI-compatible chat-completions client with structured output
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::config::LlmConfig;
use crate::error::FinsightError;

/// Reusable chat-completions client (connection-pooled)
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and require a response conforming to `schema`.
    ///
    /// Returns the raw JSON text of the first choice.
    pub async fn complete_structured(
        &self,
        prompt: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> crate::Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(FinsightError::Config(
                "OPENAI_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request = build_request(&self.model, prompt, schema_name, schema);

        info!(model = %self.model, prompt_chars = prompt.len(), "Calling LLM API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("LLM API request failed: {}", e);
                FinsightError::LlmRequest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, "LLM API error response: {}", error_text);
            return Err(FinsightError::Llm(format!(
                "LLM API returned {}: {}",
                status, error_text
            )));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse LLM response: {}", e);
            FinsightError::LlmRequest(e)
        })?;

        let content = first_content(completion)?;

        info!(response_chars = content.len(), "LLM response received");

        Ok(content)
    }
}

fn build_request(
    model: &str,
    prompt: &str,
    schema_name: &str,
    schema: serde_json::Value,
) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        temperature: 0.0,
        messages: vec![Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        response_format: ResponseFormat {
            kind: "json_schema".to_string(),
            json_schema: JsonSchemaFormat {
                name: schema_name.to_string(),
                strict: true,
                schema,
            },
        },
    }
}

fn first_content(completion: ChatResponse) -> crate::Result<String> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| FinsightError::Llm("No choices in LLM response".to_string()))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(FinsightError::Llm(format!("LLM refused: {}", refusal)));
    }

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(FinsightError::Llm(format!(
            "Empty response from LLM (finish_reason={})",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<Message>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}
