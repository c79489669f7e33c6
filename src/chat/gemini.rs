use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role("user", text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::with_role("model", text)
    }

    fn with_role(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Network(String),
    #[error("rejected credentials (HTTP {status})")]
    Auth { status: u16 },
    #[error("quota exhausted (HTTP {status})")]
    Quota { status: u16 },
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::MissingApiKey => "missing_api_key",
            GenerationError::Network(_) => "network",
            GenerationError::Auth { .. } => "auth",
            GenerationError::Quota { .. } => "quota",
            GenerationError::Http { .. } => "http",
            GenerationError::MalformedResponse(_) => "malformed_response",
        }
    }

    fn from_status(status: StatusCode, body: String) -> Self {
        let code = status.as_u16();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Auth { status: code },
            StatusCode::TOO_MANY_REQUESTS => GenerationError::Quota { status: code },
            _ => GenerationError::Http {
                status: code,
                body: truncate(&body, 512),
            },
        }
    }
}

/// Text generation behind the chat bridge.
pub trait TextGenerator: Send {
    /// Returns the first text part of the first candidate.
    fn generate(&self, contents: &[Content]) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: &'a [Content],
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    pub fn first_text(self) -> Result<String, GenerationError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::MalformedResponse("no candidates".to_string()))?;
        let content = candidate
            .content
            .ok_or_else(|| GenerationError::MalformedResponse("candidate has no content".to_string()))?;
        let part = content
            .parts
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::MalformedResponse("content has no parts".to_string()))?;
        part.text
            .ok_or_else(|| GenerationError::MalformedResponse("part has no text".to_string()))
    }
}

/// Blocking client for the `generateContent` endpoint. The whole transcript
/// is sent on every call; the service keeps no conversation state.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> Result<Self, GenerationError> {
        // The blocking builder defaults to 30s; `None` turns the timeout off.
        let http = Client::builder()
            .timeout(cfg.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, contents: &[Content]) -> Result<String, GenerationError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(GenerationError::MissingApiKey);
        };

        tracing::debug!(model = %self.model, turns = contents.len(), "generateContent");
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", key)
            .json(&GenerateRequest { contents })
            .send()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(GenerationError::from_status(status, body));
        }

        let body = resp
            .text()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        parsed.first_text()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
