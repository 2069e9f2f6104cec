//! Daily summary generation.
//!
//! Turns a day's commands and learnings into a markdown journal entry.
//! When a Gemini API key is available the entry is written by the model;
//! otherwise, or when the request fails for any reason, a static
//! rendering is produced instead. Callers always get a document.

pub mod prompt;
pub mod provider;

use chrono::NaiveDate;

use crate::config::Settings;

pub use prompt::{filter_commands, render_fallback};
pub use provider::{create_provider, GeminiProvider, SummaryProvider};

/// Produces the journal entry for `today`.
///
/// Never fails: a missing key, a network error, a bad status or an
/// unparseable response all fall back to [`render_fallback`].
pub fn generate_daily_summary(
    settings: &Settings,
    commands: &[String],
    learnings: &[String],
    today: NaiveDate,
) -> String {
    match create_provider(settings.gemini_api_key(), settings.gemini_model()) {
        Ok(provider) => summarize_with(provider.as_ref(), commands, learnings, today),
        Err(SummarizeError::NotConfigured) => {
            tracing::debug!("No Gemini API key configured, using static summary");
            render_fallback(today, commands, learnings)
        }
        Err(e) => {
            tracing::warn!("Gemini unavailable: {e}. Falling back to static summary.");
            render_fallback(today, commands, learnings)
        }
    }
}

/// Summarizes with an explicit provider, falling back on any error.
///
/// A day with nothing meaningful is rendered statically without calling
/// the provider.
pub fn summarize_with(
    provider: &dyn SummaryProvider,
    commands: &[String],
    learnings: &[String],
    today: NaiveDate,
) -> String {
    let meaningful = filter_commands(commands);
    if meaningful.is_empty() && learnings.is_empty() {
        return render_fallback(today, commands, learnings);
    }

    match request_summary(provider, &meaningful, learnings, today) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!("Gemini unavailable: {e}. Falling back to static summary.");
            render_fallback(today, commands, learnings)
        }
    }
}

fn request_summary(
    provider: &dyn SummaryProvider,
    commands: &[String],
    learnings: &[String],
    today: NaiveDate,
) -> Result<String, SummarizeError> {
    let user_prompt = prompt::build_user_prompt(today, commands, learnings);
    let response = provider.summarize(prompt::system_prompt(), &user_prompt)?;

    let summary = normalize_whitespace(&response.content);
    if summary.is_empty() {
        return Err(SummarizeError::Empty);
    }
    Ok(summary)
}

/// Trims the text and collapses runs of 3+ newlines down to 2.
fn normalize_whitespace(text: &str) -> String {
    let trimmed = text.trim();
    let mut result = String::with_capacity(trimmed.len());
    let mut consecutive_newlines = 0u32;

    for ch in trimmed.chars() {
        if ch == '\n' {
            consecutive_newlines += 1;
            if consecutive_newlines <= 2 {
                result.push(ch);
            }
        } else {
            consecutive_newlines = 0;
            result.push(ch);
        }
    }

    result
}

/// Errors that can occur while requesting a summary.
///
/// None of these escape [`generate_daily_summary`]; they select the
/// fallback and are logged.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    /// No API key is configured.
    #[error("Gemini API key not configured. Set GEMINI_API_KEY or gemini.api_key.")]
    NotConfigured,

    /// Network or connection error when calling the API.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The API returned a non-success HTTP status code.
    #[error("HTTP error ({status}): {body}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The model returned only whitespace.
    #[error("Model returned an empty summary")]
    Empty,
}
