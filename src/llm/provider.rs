use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Provider-agnostic contract for the semantic model. Implementations own
/// their wire shape, retry/backoff, and credential handling; callers see
/// only prompt-in, JSON-out.
///
/// A malformed model reply is not an error: implementations extract
/// whatever text the provider returned and parse it leniently, yielding
/// `Value::Null` when nothing usable came back. Errors are reserved for
/// transport and provider failures that survived the retry policy.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Value>;
    fn name(&self) -> &str;
}
