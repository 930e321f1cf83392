use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;

use super::prompt::SYSTEM_PROMPT;
use super::provider::{non_empty, send_json, FailureKind, Provider};

/// OpenAI chat completions (or any API compatible with it).
pub struct OpenAiProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

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
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn explain(&self, prompt: &str, timeout: Duration) -> Result<String, FailureKind> {
        let api_key = self.api_key.as_deref().ok_or(FailureKind::Unauthorized)?;

        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });
        let request = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body);

        let response = send_json(self.name(), request, timeout).await?;
        non_empty(response.pointer("/choices/0/message/content").and_then(|v| v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn provider(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(HttpClient::new(), Some("sk-test".to_string()), None)
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": " Alice paid Bob. " } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server).await.explain("prompt", TIMEOUT).await;
        assert_eq!(text, Ok("Alice paid Bob.".to_string()));
    }

    #[tokio::test]
    async fn unauthorized_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let result = provider(&server).await.explain("prompt", TIMEOUT).await;
        assert_eq!(result, Err(FailureKind::Unauthorized));
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = provider(&server).await.explain("prompt", TIMEOUT).await;
        assert_eq!(result, Err(FailureKind::Unavailable));
    }

    #[tokio::test]
    async fn unexpected_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let result = provider(&server).await.explain("prompt", TIMEOUT).await;
        assert_eq!(result, Err(FailureKind::MalformedResponse));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let result = provider(&server)
            .await
            .explain("prompt", Duration::from_millis(100))
            .await;
        assert_eq!(result, Err(FailureKind::Timeout));
    }

    #[tokio::test]
    async fn missing_api_key_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(HttpClient::new(), None, None).with_base_url(server.uri());
        assert_eq!(
            provider.explain("prompt", TIMEOUT).await,
            Err(FailureKind::Unauthorized)
        );
    }
}
