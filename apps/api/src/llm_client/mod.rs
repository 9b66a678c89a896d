//! LLM Client: the single point of entry for all Gemini API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! All LLM interactions MUST go through `CompletionProvider`.
//!
//! Model: gemini-2.5-flash (hardcoded; do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls.
pub const MODEL: &str = "gemini-2.5-flash";
const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 8192;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API key rejected: {0}")]
    InvalidKey(String),

    #[error("Prompt blocked by provider: {0}")]
    Blocked(String),

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Anything that can turn a prompt into text. `AppState` holds an
/// `Arc<dyn CompletionProvider>` so handlers never depend on the HTTP client.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, api_key: &str, prompt: &str, system: &str)
        -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateResponse {
    /// Joins the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Wraps the Gemini `generateContent` API with retry logic.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    backoff: std::time::Duration,
}

impl GeminiClient {
    pub fn new() -> Result<Self, LlmError> {
        Self::with_base_url(GEMINI_API_BASE, std::time::Duration::from_secs(1))
    }

    /// Points the client at another endpoint; `backoff` is the first retry delay.
    pub fn with_base_url(base_url: &str, backoff: std::time::Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            backoff,
        })
    }

    /// Makes a raw call to Gemini, returning the full response object.
    /// Retries transport errors, 429 (rate limit) and 5xx with exponential
    /// backoff, up to `MAX_RETRIES` attempts in total.
    pub async fn call(
        &self,
        api_key: &str,
        prompt: &str,
        system: &str,
    ) -> Result<GenerateResponse, LlmError> {
        let request_body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![RequestPart { text: system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };
        let url = format!("{}/{MODEL}:generateContent", self.base_url);

        let mut attempt = 0;
        loop {
            attempt += 1;

            let error = match self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&request_body)
                .send()
                .await
            {
                Err(e) => LlmError::Http(e),
                Ok(response) => {
                    let status = response.status().as_u16();
                    match outcome_for(status) {
                        Outcome::Success => {
                            let gemini_response: GenerateResponse = response.json().await?;
                            if let Some(usage) = &gemini_response.usage_metadata {
                                debug!(
                                    "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                                    usage.prompt_token_count, usage.candidates_token_count
                                );
                            }
                            return Ok(gemini_response);
                        }
                        Outcome::Fail => {
                            let body = response.text().await.unwrap_or_default();
                            return Err(classify_failure(status, &body));
                        }
                        Outcome::Retry => {
                            let body = response.text().await.unwrap_or_default();
                            warn!("LLM API returned {}: {}", status, body);
                            if status == 429 {
                                LlmError::RateLimited { attempts: attempt }
                            } else {
                                LlmError::Api {
                                    status,
                                    message: body,
                                }
                            }
                        }
                    }
                }
            };

            if attempt >= MAX_RETRIES {
                return Err(error);
            }
            let delay = backoff_delay(self.backoff, attempt);
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// What to do with an HTTP status from `generateContent`.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Success,
    Retry,
    Fail,
}

fn outcome_for(status: u16) -> Outcome {
    match status {
        200..=299 => Outcome::Success,
        429 | 500..=599 => Outcome::Retry,
        _ => Outcome::Fail,
    }
}

/// Exponential backoff after the given failed attempt: base, 2x base, 4x base...
fn backoff_delay(base: std::time::Duration, attempt: u32) -> std::time::Duration {
    base * (1u32 << attempt.saturating_sub(1).min(6))
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(
        &self,
        api_key: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, LlmError> {
        let response = self.call(api_key, prompt, system).await?;
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(LlmError::Blocked(reason));
        }
        response.text().ok_or(LlmError::EmptyContent)
    }
}

/// Maps a non-retryable error response. Gemini reports a bad key as
/// 400 `API_KEY_INVALID`, so that case is recognised from the body.
fn classify_failure(status: u16, body: &str) -> LlmError {
    let message = serde_json::from_str::<GeminiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == 401 || status == 403 || body.contains("API_KEY_INVALID") {
        LlmError::InvalidKey(message)
    } else {
        LlmError::Api { status, message }
    }
}

/// Normalises model output into clean markdown.
///
/// Some SDK paths hand back the repr of a message object (`content='...'`)
/// with escaped newlines; unwrap that, drop carriage returns and collapse
/// runs of blank lines.
pub fn tidy_markdown(raw: &str) -> String {
    let mut text = raw.trim();
    for quote in ['\'', '"'] {
        let prefix = format!("content={quote}");
        if let Some(inner) = text.strip_prefix(prefix.as_str()) {
            text = inner.strip_suffix(quote).unwrap_or(inner);
            break;
        }
    }

    let mut text = text.replace("\\n", "\n").replace('\r', "");
    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }
    text.trim().to_string()
}
