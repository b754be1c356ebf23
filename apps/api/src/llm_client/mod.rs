/// LLM Client: the single point of entry for all Gemini API calls in Jobmatch.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Matching code depends only on the `TextGenerator` trait so tests can inject
/// an in-memory generator and startup can decide between live and simulated mode.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod json_extract;

/// Default model when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Result of one text-generation call.
///
/// `text` is `None` when the provider returned no candidate text, which is
/// what happens when the prompt itself was blocked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub text: Option<String>,
    pub block_reason: Option<String>,
}

impl Generation {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_blocked(&self) -> bool {
        self.block_reason.is_some()
    }
}

/// A single text-generation call: prompt in, completion out.
///
/// Carried inside `AiEngine` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> Result<Generation, LlmError>;

    fn model_name(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GenerateContentResponse {
    fn into_generation(self) -> Generation {
        let text = self.candidates.first().and_then(|candidate| {
            let parts = &candidate.content.as_ref()?.parts;
            let joined: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
            (!joined.is_empty()).then_some(joined)
        });

        let block_reason = self
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .or_else(|| {
                // A candidate stopped for SAFETY carries no text either.
                self.candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .filter(|r| *r == "SAFETY")
                    .map(String::from)
            });

        Generation { text, block_reason }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the Gemini `generateContent` endpoint with retry logic.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, api_base: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    /// Makes one generation call. Retries on 429 (rate limit) and 5xx errors
    /// with exponential backoff.
    async fn generate_content(&self, prompt: &str) -> Result<Generation, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let endpoint = self.endpoint();

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

            if let Some(usage) = &parsed.usage_metadata {
                debug!(
                    "Gemini call succeeded: prompt_tokens={:?}, candidate_tokens={:?}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(parsed.into_generation());
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_joins_all_text_parts() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "[{\"id\": "}, {"text": "\"1\"}]"}]}, "finishReason": "STOP"}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 7}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let generation = parsed.into_generation();
        assert_eq!(generation.text(), Some("[{\"id\": \"1\"}]"));
        assert!(!generation.is_blocked());
    }

    #[test]
    fn test_generation_reports_prompt_block_reason() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let generation = parsed.into_generation();
        assert!(generation.text().is_none());
        assert_eq!(generation.block_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_generation_treats_safety_finish_as_blocked() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let generation = parsed.into_generation();
        assert!(generation.is_blocked());
        assert!(generation.text().is_none());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = GeminiClient::new(
            "key".to_string(),
            DEFAULT_MODEL.to_string(),
            format!("{DEFAULT_API_BASE}/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn test_request_serializes_gemini_shape() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["contents"][0]["role"], "user");
    }
}
