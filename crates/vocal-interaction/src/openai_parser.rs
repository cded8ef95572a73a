//! OpenAiScheduleParser - Direct REST implementation of the parsing
//! capability against the OpenAI Chat Completions API.
//!
//! Uses JSON response mode and a strict output contract so decoding is a
//! pure function that can be unit-tested without network access.

use crate::parser::ScheduleParser;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use vocal_core::{Language, PartialFields, Result, VocalError};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Parsing capability backed by the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiScheduleParser {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiScheduleParser {
    /// Creates a new parser with the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 256,
        }
    }

    /// Loads the API key from the `OPENAI_API_KEY` environment variable.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            VocalError::config("OPENAI_API_KEY not found in environment variables")
        })?;
        Ok(Self::new(api_key))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(BASE_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                VocalError::parse_unavailable(format!("OpenAI API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            VocalError::parse_unavailable(format!("Failed to parse OpenAI response: {err}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                VocalError::parse_unavailable("OpenAI API returned no content in the response")
            })
    }
}

#[async_trait]
impl ScheduleParser for OpenAiScheduleParser {
    async fn parse(
        &self,
        transcript: &str,
        language: Language,
        anchor: NaiveDateTime,
        context: &str,
    ) -> Result<PartialFields> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Ok(PartialFields::default());
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(language, anchor, context),
                },
                ChatMessage {
                    role: "user",
                    content: transcript.to_string(),
                },
            ],
        };

        let text = self.send_request(&request).await?;
        tracing::debug!(model = %self.model, "schedule parse call completed");
        decode_fields(&text)
    }
}

/// Builds the extraction system prompt for one turn.
///
/// The anchor is supplied per call so "tomorrow" resolves relative to the
/// current turn, never session start.
fn system_prompt(language: Language, anchor: NaiveDateTime, context: &str) -> String {
    let anchor_date = anchor.format("%Y-%m-%d");
    let anchor_weekday = anchor.format("%A");
    let anchor_time = anchor.format("%H:%M");

    let context_section = if context.is_empty() {
        String::new()
    } else {
        format!(
            "\nCONVERSATION CONTEXT:\n{context}\n\n\
             Use this context to understand follow-up responses. For example:\n\
             - If the pending event has a title and the user says \"make it 2pm\", extract only the time.\n\
             - If the user proposes a new time after a conflict (\"how about 3pm instead\"), extract only the time.\n\
             - Set \"new_request\" to true only when the user clearly starts an unrelated booking\n\
               (e.g. \"actually, add a different meeting\").\n"
        )
    };

    format!(
        "You are a schedule parsing assistant. Extract scheduling information from user input.\n\
         \n\
         Current date: {anchor_date} ({anchor_weekday})\n\
         Current time: {anchor_time}\n\
         Session language: {}\n\
         {context_section}\n\
         Extract any of the following fields present in the user's request:\n\
         1. title: the name/description of the event\n\
         2. date: the date of the event (YYYY-MM-DD)\n\
         3. time: the start time (HH:MM, 24-hour)\n\
         4. duration_minutes: the duration in minutes, if stated (e.g. \"for 2 hours\" = 120)\n\
         \n\
         Time format rules - ALL of these are valid times:\n\
         - \"10am\", \"10 am\", \"10 a.m.\", \"10AM\" = 10:00\n\
         - \"2:30pm\", \"2:30 pm\", \"2:30 p.m.\" = 14:30\n\
         - \"noon\" = 12:00\n\
         - \"midnight\" = 00:00\n\
         \n\
         Rules:\n\
         - \"today\" = {anchor_date}\n\
         - \"tomorrow\" = the day after {anchor_date}\n\
         - \"next Monday/Tuesday/etc\" = the upcoming weekday after today\n\
         - Handle both English and Chinese input\n\
         - Use null for any field the user did not mention; never guess\n\
         \n\
         Respond ONLY with valid JSON (no markdown, no explanation):\n\
         {{\"title\": string|null, \"date\": \"YYYY-MM-DD\"|null, \"time\": \"HH:MM\"|null, \
         \"duration_minutes\": number|null, \"new_request\": boolean}}",
        language.tag(),
    )
}

/// Raw wire shape of one parse result.
#[derive(Deserialize)]
struct RawFields {
    title: Option<String>,
    date: Option<String>,
    time: Option<String>,
    duration_minutes: Option<u32>,
    #[serde(default)]
    new_request: bool,
}

/// Decodes the model's JSON reply into [`PartialFields`].
///
/// Any malformed payload (invalid JSON, unparseable date/time) is a
/// `ParseUnavailable`, matching the capability contract.
pub fn decode_fields(text: &str) -> Result<PartialFields> {
    let raw: RawFields = serde_json::from_str(text.trim()).map_err(|err| {
        VocalError::parse_unavailable(format!("Malformed parser output: {err}"))
    })?;

    let date = raw
        .date
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|err| {
                VocalError::parse_unavailable(format!("Malformed date '{s}': {err}"))
            })
        })
        .transpose()?;

    let start_time = raw
        .time
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveTime::parse_from_str(&s, "%H:%M").map_err(|err| {
                VocalError::parse_unavailable(format!("Malformed time '{s}': {err}"))
            })
        })
        .transpose()?;

    Ok(PartialFields {
        title: raw.title.filter(|s| !s.trim().is_empty()),
        date,
        start_time,
        duration_minutes: raw.duration_minutes,
        new_request: raw.new_request,
    })
}

fn map_http_error(status: StatusCode, body: String) -> VocalError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    VocalError::parse_unavailable(format!("OpenAI API error ({status}): {message}"))
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    max_tokens: u32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
