//! Optional model-generated explanations with a single fallback hop.
//!
//! Failures never escape this module: they become a short
//! `"<provider>: <category>"` string on the result.

mod anthropic;
mod openai;
mod prompt;
mod provider;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use prompt::{build_prompt, ExplainContext, SYSTEM_PROMPT};
pub use provider::{FailureKind, Provider, ProviderId};

/// Orchestrator settings, handed over explicitly at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainerConfig {
    pub provider: ProviderId,
    pub fallback_provider: Option<ProviderId>,
    pub timeout: Duration,
    pub model: Option<String>,
    pub fallback_model: Option<String>,
}

/// Credentials and endpoints for the concrete providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
}

pub fn build_provider(
    id: ProviderId,
    model: Option<String>,
    settings: &ProviderSettings,
    http_client: HttpClient,
) -> Arc<dyn Provider> {
    match id {
        ProviderId::OpenAi => {
            let provider = OpenAiProvider::new(http_client, settings.openai_api_key.clone(), model);
            match &settings.openai_base_url {
                Some(url) => Arc::new(provider.with_base_url(url.as_str())),
                None => Arc::new(provider),
            }
        }
        ProviderId::Anthropic => {
            let provider =
                AnthropicProvider::new(http_client, settings.anthropic_api_key.clone(), model);
            match &settings.anthropic_base_url {
                Some(url) => Arc::new(provider.with_base_url(url.as_str())),
                None => Arc::new(provider),
            }
        }
    }
}

/// Result of one explanation attempt cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Explanation {
    pub text: Option<String>,
    pub error: Option<String>,
}

pub struct AiExplainer {
    primary: Arc<dyn Provider>,
    fallback: Option<Arc<dyn Provider>>,
    timeout: Duration,
}

impl AiExplainer {
    pub fn new(
        primary: Arc<dyn Provider>,
        fallback: Option<Arc<dyn Provider>>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            timeout,
        }
    }

    pub fn from_config(
        config: &ExplainerConfig,
        settings: &ProviderSettings,
        http_client: HttpClient,
    ) -> Self {
        let primary = build_provider(
            config.provider,
            config.model.clone(),
            settings,
            http_client.clone(),
        );
        let fallback = config.fallback_provider.map(|id| {
            build_provider(id, config.fallback_model.clone(), settings, http_client)
        });
        Self::new(primary, fallback, config.timeout)
    }

    /// Asks the primary provider, then the fallback once if the primary
    /// failed or ran out of time. Never more than two calls, never in
    /// parallel.
    ///
    /// Returns `None` if `cancel` fires first; nothing is reported for a
    /// cancelled cycle.
    pub async fn explain(
        &self,
        ctx: &ExplainContext<'_>,
        cancel: &CancellationToken,
    ) -> Option<Explanation> {
        let prompt = build_prompt(ctx);
        debug!(digest = ctx.digest, prompt = %prompt, "built explainer prompt");

        let mut last_error = None;
        for (hop, provider) in std::iter::once(&self.primary)
            .chain(self.fallback.as_ref())
            .enumerate()
        {
            if hop > 0 {
                info!(provider = provider.name(), "falling back to secondary AI provider");
            }

            let call = tokio::time::timeout(self.timeout, provider.explain(&prompt, self.timeout));
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(digest = ctx.digest, "explanation cancelled");
                    return None;
                }
                outcome = call => outcome,
            };

            let failure = match outcome {
                Ok(Ok(text)) => {
                    return Some(Explanation {
                        text: Some(text),
                        error: None,
                    })
                }
                Ok(Err(failure)) => failure,
                Err(_) => FailureKind::Timeout,
            };
            warn!(provider = provider.name(), %failure, "AI provider failed");
            last_error = Some(format!("{}: {}", provider.name(), failure));
        }

        Some(Explanation {
            text: None,
            error: last_error,
        })
    }
}
