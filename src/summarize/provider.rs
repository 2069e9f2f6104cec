//! Language model integration for daily summaries.
//!
//! The summarizer talks to a [`SummaryProvider`]; [`GeminiProvider`] is
//! the production implementation backed by the Gemini
//! `generateContent` endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::SummarizeError;

/// Public Gemini API root.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Timeout for establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the entire request including response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const TEMPERATURE: f64 = 0.3;
const TOP_P: f64 = 0.85;
const MAX_OUTPUT_TOKENS: u32 = 1200;

// ==================== Types ====================

/// Response from a summary request.
#[derive(Debug, Clone)]
pub struct SummaryResponse {
    /// The generated markdown.
    pub content: String,
}

// ==================== Trait ====================

/// Something that can turn a prompt pair into generated text.
pub trait SummaryProvider {
    /// Sends the system instruction and the user turn, returning the
    /// model's text.
    fn summarize(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<SummaryResponse, SummarizeError>;
}

// ==================== Gemini ====================

/// Google Gemini API provider.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    /// Model identifier (e.g., "gemini-2.5-flash").
    model: String,
    /// API root the model path is appended to.
    base_url: String,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self::with_base_url(client, api_key, model, GEMINI_API_BASE.to_string())
    }

    /// Points the provider at a different API root.
    pub fn with_base_url(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Builds the JSON request body for `generateContent`.
    fn build_request_body(&self, system_prompt: &str, user_content: &str) -> Value {
        serde_json::json!({
            "system_instruction": {
                "parts": [{ "text": system_prompt }]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": user_content }]
                }
            ],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "topP": TOP_P,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            }
        })
    }
}

impl SummaryProvider for GeminiProvider {
    fn summarize(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<SummaryResponse, SummarizeError> {
        let body = self.build_request_body(system_prompt, user_content);

        tracing::debug!("Requesting summary from {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| SummarizeError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SummarizeError::HttpError {
                status: status_code,
                body: body_text,
            });
        }

        let json: Value = response
            .json()
            .map_err(|e| SummarizeError::ParseError(e.to_string()))?;

        parse_gemini_response(&json)
    }
}

/// Extracts `candidates[0].content.parts[0].text`.
fn parse_gemini_response(json: &Value) -> Result<SummaryResponse, SummarizeError> {
    let content = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|p| p.as_array())
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| {
            SummarizeError::ParseError(
                "Missing candidates[0].content.parts[0].text in Gemini response".to_string(),
            )
        })?;

    Ok(SummaryResponse {
        content: content.to_string(),
    })
}

// ==================== Factory ====================

fn build_client() -> Result<Client, SummarizeError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SummarizeError::RequestFailed(format!("Failed to build HTTP client: {e}")))
}

/// Creates the Gemini provider for `api_key`.
///
/// A missing or blank key is [`SummarizeError::NotConfigured`].
pub fn create_provider(
    api_key: Option<String>,
    model: String,
) -> Result<Box<dyn SummaryProvider>, SummarizeError> {
    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(SummarizeError::NotConfigured)?;
    let client = build_client()?;
    Ok(Box::new(GeminiProvider::new(client, api_key, model)))
}
