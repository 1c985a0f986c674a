//! Classifier — maps a posting's text plus the user profile to a structured
//! relevance verdict via an OpenRouter chat-completions call.
//!
//! ARCHITECTURAL RULE: no other module calls the LLM endpoint directly; all
//! model interaction goes through this one. Parsing is strict — a response
//! that cannot be parsed surfaces as a `ClassifyError` and is never
//! downgraded into a rejection verdict.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ClassifyError;
use crate::models::Posting;

pub mod prompts;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const TEMPERATURE: f32 = 0.1;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// The fixed user profile postings are scored against.
#[derive(Debug, Clone)]
pub struct Profile {
    pub skills: String,
    pub experience: String,
    pub preferences: String,
}

/// Structured relevance verdict returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub is_relevant: bool,
    pub score: u8,
    pub reason: String,
    pub summary: String,
    #[serde(default)]
    pub skills_match: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, posting: &Posting, profile: &Profile)
        -> Result<Verdict, ClassifyError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenRouter-backed classifier. Retries 429 and 5xx responses with
/// exponential backoff before giving up on a posting.
#[derive(Clone)]
pub struct OpenRouterClassifier {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenRouterClassifier {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
        }
    }

    async fn call(&self, prompt: &str) -> Result<String, ClassifyError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::EVALUATION_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let mut last_error: Option<ClassifyError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Classifier call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(OPENROUTER_API_URL)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ClassifyError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Classifier API returned {}: {}", status, body);
                last_error = Some(ClassifyError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(ClassifyError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;
            let content = chat
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or(ClassifyError::EmptyContent)?;

            debug!("Classifier call succeeded ({} bytes)", content.len());
            return Ok(content);
        }

        Err(last_error.unwrap_or(ClassifyError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl Classifier for OpenRouterClassifier {
    async fn classify(
        &self,
        posting: &Posting,
        profile: &Profile,
    ) -> Result<Verdict, ClassifyError> {
        let prompt = build_prompt(posting, profile);
        let content = self.call(&prompt).await?;
        parse_verdict(&content)
    }
}

/// Fills the evaluation template from posting and profile text. Deterministic:
/// identical inputs always produce the identical request.
pub fn build_prompt(posting: &Posting, profile: &Profile) -> String {
    prompts::EVALUATION_PROMPT_TEMPLATE
        .replace("{title}", &posting.title)
        .replace("{company}", &posting.company)
        .replace("{location}", &posting.location)
        .replace("{description}", &posting.description)
        .replace("{skills}", &profile.skills)
        .replace("{experience}", &profile.experience)
        .replace("{preferences}", &profile.preferences)
}

/// Strict verdict parsing. Tolerates markdown code fences around the JSON
/// but nothing else; any failure propagates instead of defaulting to a
/// not-relevant verdict.
pub fn parse_verdict(content: &str) -> Result<Verdict, ClassifyError> {
    let text = strip_json_fences(content);
    let verdict: Verdict = serde_json::from_str(text)?;
    if verdict.score > 100 {
        return Err(ClassifyError::ScoreOutOfRange(verdict.score));
    }
    Ok(verdict)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// Unfenced text passes through untouched; an unterminated fence loses only
/// its opening marker.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let body = body.trim_start();
    body.strip_suffix("```").map(str::trim).unwrap_or(body)
}
