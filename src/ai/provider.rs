use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Identifier of a supported language-model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ProviderId {
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "anthropic")]
    Anthropic,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Why a provider call produced no text. Rendered in the kebab-case form
/// that ends up in `aiExplainerError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("timeout")]
    Timeout,
    #[error("unauthorized")]
    Unauthorized,
    #[error("unavailable")]
    Unavailable,
    #[error("malformed-response")]
    MalformedResponse,
}

impl FailureKind {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Unauthorized,
            _ => Self::Unavailable,
        }
    }

    pub fn from_request_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::MalformedResponse
        } else {
            Self::Unavailable
        }
    }
}

/// A language model that turns a prompt into an explanation.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn explain(&self, prompt: &str, timeout: Duration) -> Result<String, FailureKind>;
}

/// Sends a JSON request and returns the decoded body of a 2xx response.
pub(crate) async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<Value, FailureKind> {
    let response = request.timeout(timeout).send().await.map_err(|e| {
        warn!(provider = %provider, "request failed: {}", e);
        FailureKind::from_request_error(&e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(provider = %provider, %status, "provider returned an error: {}", body);
        return Err(FailureKind::from_status(status));
    }

    response
        .json::<Value>()
        .await
        .map_err(|_| FailureKind::MalformedResponse)
}

/// Trims model output; blank text counts as a malformed response.
pub(crate) fn non_empty(text: Option<&str>) -> Result<String, FailureKind> {
    match text.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(FailureKind::MalformedResponse),
    }
}
