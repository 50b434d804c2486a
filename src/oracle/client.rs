//! Core `TextOracle` trait and `ApiOracle` implementation.
//!
//! `ApiOracle` calls any OpenAI-compatible `/v1/chat/completions` endpoint
//! — Ollama (OpenAI mode), OpenAI, Groq, LM Studio, vLLM, etc.
//! All connection details come from [`OracleConfig`]; nothing is hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::OracleConfig;
use crate::oracle::prompt::SYSTEM_INSTRUCTION;

// ---------------------------------------------------------------------------
// OracleError
// ---------------------------------------------------------------------------

/// Errors that can occur while asking the oracle for a score.
///
/// None of these ever reach the caller of the scorer: every variant is
/// treated as "oracle unavailable" and scoring falls back to heuristics.
#[derive(Debug, Error)]
pub enum OracleError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the timeout.
    #[error("oracle request timed out")]
    Timeout,

    /// The response could not be parsed as expected.
    #[error("failed to parse oracle response: {0}")]
    Parse(String),

    /// The response carried no usable text.
    #[error("oracle returned an empty response")]
    EmptyResponse,

    /// The oracle answered with a number outside `[0, 1]`.
    #[error("oracle score {0} is outside [0, 1]")]
    OutOfRange(f32),
}

impl From<reqwest::Error> for OracleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OracleError::Timeout
        } else {
            OracleError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TextOracle trait
// ---------------------------------------------------------------------------

/// Async capability that scores how strongly a prompt suggests a sound.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn TextOracle>`.
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Return a confidence in `[0, 1]`.  `timeout` is the caller's budget;
    /// the caller also enforces it independently.
    async fn score(&self, prompt: &str, timeout: Duration) -> Result<f32, OracleError>;

    /// Cheap readiness check; returning `false` skips the call entirely.
    fn is_available(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// ApiOracle
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiOracle {
    client: reqwest::Client,
    config: OracleConfig,
}

impl ApiOracle {
    /// Build an `ApiOracle` from application config.
    ///
    /// A default (no-timeout) client is used if the builder fails; the
    /// per-request timeout is still applied on every call.
    pub fn from_config(config: &OracleConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl TextOracle for ApiOracle {
    async fn score(&self, prompt: &str, timeout: Duration) -> Result<f32, OracleError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user",   "content": prompt }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  8
        });

        let mut req = self.client.post(&url).timeout(timeout).json(&body);

        // Attach Authorization header only when api_key is a non-empty string.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?.error_for_status()?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(OracleError::EmptyResponse)?;

        parse_score(content)
    }

    fn is_available(&self) -> bool {
        self.config.enabled && !self.config.base_url.is_empty()
    }
}

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-+]?\d*\.?\d+").unwrap());

/// Extract the first number in a model reply and check it is a valid score.
pub fn parse_score(reply: &str) -> Result<f32, OracleError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    let number = NUMBER
        .find(reply)
        .ok_or_else(|| OracleError::Parse(format!("no number in {reply:?}")))?;

    let score: f32 = number
        .as_str()
        .parse()
        .map_err(|e: std::num::ParseFloatError| OracleError::Parse(e.to_string()))?;

    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(OracleError::OutOfRange(score))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
