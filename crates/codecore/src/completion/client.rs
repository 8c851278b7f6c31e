//! HTTP client for an OpenAI-compatible chat completions endpoint.
//!
//! Calls are made once, with no retry or backoff: a failed call is reported
//! to the caller as a typed [`AppError`] and the caller decides what to do.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ChatMessage, CompletionBackend};
use crate::config::CompletionConfig;
use crate::error::{AppError, AppResult};

/// How much of an unparseable body is kept in error messages
const BODY_SNIPPET_CHARS: usize = 200;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResponse {
    Error { error: RawErrorDetail },
    Choices { choices: Vec<RawChoice> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawErrorDetail {
    Structured { message: Option<String> },
    Text(String),
}

#[derive(Deserialize)]
struct RawChoice {
    message: Option<RawContent>,
    delta: Option<RawContent>,
}

#[derive(Deserialize)]
struct RawContent {
    content: Option<String>,
}

/// The recognized shapes of a completion response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// `choices[0].message.content`
    FullMessage(Option<String>),
    /// `choices[0].delta.content`, as sent by streaming-style endpoints
    PartialDelta(Option<String>),
    /// `error.message` (or a bare `error` string)
    Error(String),
}

/// Classifies a response body into one of the recognized shapes.
///
/// # Errors
///
/// * `UnknownResponseShape` - not JSON, or none of the shapes match
/// * `Upstream` - a `choices` array without a usable first entry
pub fn parse_response(body: &str) -> AppResult<ResponseShape> {
    let raw: RawResponse =
        serde_json::from_str(body).map_err(|_| AppError::UnknownResponseShape(snippet(body)))?;

    match raw {
        RawResponse::Error { error } => {
            let message = match error {
                RawErrorDetail::Structured { message } => message.unwrap_or_else(|| "unspecified error".to_string()),
                RawErrorDetail::Text(text) => text,
            };
            Ok(ResponseShape::Error(message))
        }
        RawResponse::Choices { choices } => {
            let first = choices
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Upstream("response contained no choices".to_string()))?;
            match (first.message, first.delta) {
                (Some(message), _) => Ok(ResponseShape::FullMessage(message.content)),
                (None, Some(delta)) => Ok(ResponseShape::PartialDelta(delta.content)),
                (None, None) => Err(AppError::Upstream("first choice has no message or delta".to_string())),
            }
        }
    }
}

/// Turns a recognized shape into answer text.
///
/// Absent or blank content is `EmptyResponse`; an error shape is `Upstream`.
pub fn extract_text(shape: ResponseShape) -> AppResult<String> {
    let content = match shape {
        ResponseShape::FullMessage(content) | ResponseShape::PartialDelta(content) => content,
        ResponseShape::Error(message) => return Err(AppError::Upstream(message)),
    };

    match content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::EmptyResponse),
    }
}

fn snippet(body: &str) -> String {
    let mut out: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
    if body.chars().count() > BODY_SNIPPET_CHARS {
        out.push('…');
    }
    out
}

/// Completion backend talking to a remote HTTP endpoint
pub struct HttpCompletionClient {
    http: reqwest::Client,
    api_url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl HttpCompletionClient {
    /// Creates a client from the completion section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no API key is configured or the HTTP
    /// client cannot be built.
    pub fn new(config: &CompletionConfig) -> AppResult<Self> {
        let api_key = SecretString::from(config.require_api_key()?.expose_secret().to_string());

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::Timeout(self.timeout)
        } else {
            AppError::Upstream(format!("request failed: {}", err))
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            log::warn!("Completion API returned status {}", status);
            return Err(match parse_response(&body) {
                Ok(ResponseShape::Error(message)) => AppError::Upstream(format!("{}: {}", status, message)),
                _ => AppError::Upstream(format!("HTTP {}: {}", status, snippet(&body))),
            });
        }

        extract_text(parse_response(&body)?)
    }
}
