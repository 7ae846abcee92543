use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::llm::parser::parse_json_lenient;
use crate::llm::provider::LlmProvider;
use crate::llm::retry::{run_with_backoff, RetryPolicy};

const DEFAULT_URL_TEMPLATE: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    url_template: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Gemini API key is required".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            model,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            retry,
        })
    }

    async fn attempt(&self, prompt: &str) -> Result<Value> {
        let url = self.url_template.replace("{model}", &self.model);

        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 2000,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
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
        let envelope: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

        Ok(match extract_payload(&envelope) {
            Extracted::Json(value) => value,
            Extracted::Text(text) => parse_json_lenient(&text),
        })
    }
}

enum Extracted {
    /// The candidate already carried structured JSON (inline json part or a
    /// function-call args object).
    Json(Value),
    /// Text payload still needing a parse; empty when nothing was found.
    Text(String),
}

/// Walk the candidate/content/parts nesting Gemini responses come in.
/// Handles text parts, inline `json` parts, functionCall args, a bare
/// `text` on the candidate, and content given as either an object or a
/// part list. Falls back to empty text rather than failing.
fn extract_payload(envelope: &Value) -> Extracted {
    let candidate = match envelope
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
    {
        Some(candidate) => candidate,
        None => return Extracted::Text(String::new()),
    };

    let parts = match candidate.get("content") {
        Some(Value::Object(content)) => content.get("parts").and_then(Value::as_array),
        Some(Value::Array(parts)) => Some(parts),
        _ => None,
    };

    if let Some(first) = parts.and_then(|p| p.first()) {
        if let Some(text) = first.get("text").and_then(Value::as_str) {
            return Extracted::Text(text.to_string());
        }
        if let Some(json) = first.get("json") {
            return Extracted::Json(json.clone());
        }
        if let Some(args) = first
            .get("functionCall")
            .and_then(|call| call.get("args"))
        {
            return Extracted::Json(args.clone());
        }
    }

    if let Some(text) = candidate.get("text").and_then(Value::as_str) {
        return Extracted::Text(text.to_string());
    }

    Extracted::Text(String::new())
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<Value> {
        run_with_backoff(&self.retry, |attempt| {
            tracing::debug!("Gemini request attempt {} ({})", attempt, self.model);
            self.attempt(prompt)
        })
        .await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_of(extracted: Extracted) -> String {
        match extracted {
            Extracted::Text(text) => text,
            Extracted::Json(_) => panic!("expected text"),
        }
    }

    #[test]
    fn extracts_text_part() {
        let envelope = json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"overall_sentiment\": \"negative\"}"}]}
            }]
        });
        assert_eq!(
            text_of(extract_payload(&envelope)),
            "{\"overall_sentiment\": \"negative\"}"
        );
    }

    #[test]
    fn extracts_inline_json_part() {
        let envelope = json!({
            "candidates": [{"content": {"parts": [{"json": {"themes": []}}]}}]
        });
        match extract_payload(&envelope) {
            Extracted::Json(value) => assert_eq!(value, json!({"themes": []})),
            Extracted::Text(_) => panic!("expected json"),
        }
    }

    #[test]
    fn extracts_function_call_args() {
        let envelope = json!({
            "candidates": [{
                "content": {"parts": [{"functionCall": {"name": "emit", "args": {"reasoning": "ok"}}}]}
            }]
        });
        match extract_payload(&envelope) {
            Extracted::Json(value) => assert_eq!(value["reasoning"], "ok"),
            Extracted::Text(_) => panic!("expected json"),
        }
    }

    #[test]
    fn content_as_part_list_is_supported() {
        let envelope = json!({
            "candidates": [{"content": [{"text": "payload"}]}]
        });
        assert_eq!(text_of(extract_payload(&envelope)), "payload");
    }

    #[test]
    fn candidate_level_text_is_a_fallback() {
        let envelope = json!({"candidates": [{"text": "plain"}]});
        assert_eq!(text_of(extract_payload(&envelope)), "plain");
    }

    #[test]
    fn unextractable_shapes_fall_back_to_empty() {
        assert_eq!(text_of(extract_payload(&json!({}))), "");
        assert_eq!(text_of(extract_payload(&json!({"candidates": []}))), "");
        assert_eq!(
            text_of(extract_payload(&json!({"candidates": [{"content": {}}]}))),
            ""
        );
    }

    #[test]
    fn empty_key_is_a_config_error() {
        let result = GeminiProvider::new(
            String::new(),
            "gemini-2.5-flash".into(),
            Duration::from_secs(60),
            RetryPolicy::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
