use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};

use super::prompt::SYSTEM_PROMPT;
use super::provider::{non_empty, send_json, FailureKind, Provider};

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 512;

/// Anthropic Messages API.
pub struct AnthropicProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-haiku-latest";

    pub fn new(http_client: HttpClient, api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            http_client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn explain(&self, prompt: &str, timeout: Duration) -> Result<String, FailureKind> {
        let api_key = self.api_key.as_deref().ok_or(FailureKind::Unauthorized)?;

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let request = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let response = send_json(self.name(), request, timeout).await?;
        let text = response
            .get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            })
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str);
        non_empty(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "key"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "type": "thinking", "thinking": "..." },
                    { "type": "text", "text": "Bob received 0.2 SUI." }
                ]
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(HttpClient::new(), Some("key".to_string()), None)
            .with_base_url(server.uri());
        assert_eq!(
            provider.explain("prompt", TIMEOUT).await,
            Ok("Bob received 0.2 SUI.".to_string())
        );
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(HttpClient::new(), Some("key".to_string()), None)
            .with_base_url(server.uri());
        assert_eq!(
            provider.explain("prompt", TIMEOUT).await,
            Err(FailureKind::MalformedResponse)
        );
    }
}
