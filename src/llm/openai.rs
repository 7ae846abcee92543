use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::llm::parser::parse_json_lenient;
use crate::llm::provider::LlmProvider;
use crate::llm::retry::{run_with_backoff, RetryPolicy};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat-completions client with JSON response mode. Temperature is pinned
/// to zero so repeated runs over the same corpus stay comparable.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    api_url: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Value,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key is required".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            model,
            api_url: DEFAULT_API_URL.to_string(),
            retry,
        })
    }

    async fn attempt(&self, prompt: &str) -> Result<Value> {
        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.0,
            max_tokens: 2000,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::provider(status, body));
        }

        // An unrecognizable 200 body is treated as an empty reply, not an
        // error: schema repair owns malformed output.
        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).unwrap_or(ChatResponse { choices: Vec::new() });

        Ok(parse_json_lenient(&extract_content(parsed)))
    }
}

/// Normalize the message content field: a plain string in the common case,
/// or an array of typed content parts whose text fragments are joined.
fn extract_content(response: ChatResponse) -> String {
    let content = match response.choices.into_iter().next() {
        Some(choice) => choice.message.content,
        None => return String::new(),
    };

    match content {
        Value::String(text) => text,
        Value::Array(parts) => parts
            .into_iter()
            .filter_map(|part| {
                part.get("text")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string())
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<Value> {
        run_with_backoff(&self.retry, |attempt| {
            tracing::debug!("OpenAI request attempt {} ({})", attempt, self.model);
            self.attempt(prompt)
        })
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }
}
