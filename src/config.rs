use std::time::Duration;

use clap::{Args, Parser};

use crate::ai::{ExplainerConfig, ProviderId, ProviderSettings};
use crate::rpc::NetworkInfo;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub sui: SuiConfig,

    #[command(flatten)]
    pub ai: AiConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Server port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Upper bound for handling one request, AI explanation included
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,
}

/// Sui network settings
#[derive(Debug, Clone, Args)]
pub struct SuiConfig {
    /// Sui full node JSON-RPC URL
    #[arg(long, env = "SUI_RPC_URL", default_value = "https://fullnode.mainnet.sui.io:443")]
    pub sui_rpc_url: String,

    /// Network name, used for display and explorer links
    #[arg(long, env = "SUI_NETWORK", default_value = "mainnet")]
    pub sui_network: String,

    /// Explorer base URL; the network name is appended
    #[arg(long, env = "SUI_EXPLORER_URL", default_value = "https://suiscan.xyz")]
    pub sui_explorer_url: String,
}

impl SuiConfig {
    pub fn network_info(&self) -> NetworkInfo {
        NetworkInfo {
            name: format!("Sui {}", self.sui_network),
            network: self.sui_network.clone(),
            rpc_url: self.sui_rpc_url.clone(),
            explorer_url: format!(
                "{}/{}",
                self.sui_explorer_url.trim_end_matches('/'),
                self.sui_network
            ),
        }
    }
}

/// AI explainer settings
#[derive(Debug, Clone, Args)]
pub struct AiConfig {
    /// Primary AI provider
    #[arg(long, env = "AI_PROVIDER", value_enum, default_value_t = ProviderId::OpenAi)]
    pub ai_provider: ProviderId,

    /// Provider tried once if the primary fails or times out
    #[arg(long, env = "AI_FALLBACK_PROVIDER", value_enum)]
    pub ai_fallback_provider: Option<ProviderId>,

    /// Per-call timeout for each provider
    #[arg(long, env = "AI_TIMEOUT_MS", default_value = "15000")]
    pub ai_timeout_ms: u64,

    /// Model for the primary provider (provider default if unset)
    #[arg(long, env = "AI_MODEL")]
    pub ai_model: Option<String>,

    /// Model for the fallback provider (provider default if unset)
    #[arg(long, env = "AI_FALLBACK_MODEL")]
    pub ai_fallback_model: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    /// Anthropic API base URL
    #[arg(long, env = "ANTHROPIC_BASE_URL")]
    pub anthropic_base_url: Option<String>,
}

impl AiConfig {
    pub fn explainer_config(&self) -> ExplainerConfig {
        ExplainerConfig {
            provider: self.ai_provider,
            fallback_provider: self
                .ai_fallback_provider
                .filter(|fallback| *fallback != self.ai_provider),
            timeout: Duration::from_millis(self.ai_timeout_ms),
            model: self.ai_model.clone(),
            fallback_model: self.ai_fallback_model.clone(),
        }
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            openai_api_key: self.openai_api_key.clone(),
            openai_base_url: self.openai_base_url.clone(),
            anthropic_api_key: self.anthropic_api_key.clone(),
            anthropic_base_url: self.anthropic_base_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_into_explainer_config() {
        let config = Config::try_parse_from([
            "suidigest",
            "--ai-provider",
            "anthropic",
            "--ai-fallback-provider",
            "openai",
            "--ai-timeout-ms",
            "2500",
            "--ai-model",
            "claude-3-5-sonnet-latest",
        ])
        .unwrap();

        assert_eq!(
            config.ai.explainer_config(),
            ExplainerConfig {
                provider: ProviderId::Anthropic,
                fallback_provider: Some(ProviderId::OpenAi),
                timeout: Duration::from_millis(2500),
                model: Some("claude-3-5-sonnet-latest".to_string()),
                fallback_model: None,
            }
        );
    }

    #[test]
    fn fallback_equal_to_primary_is_dropped() {
        let config = Config::try_parse_from([
            "suidigest",
            "--ai-provider",
            "openai",
            "--ai-fallback-provider",
            "openai",
        ])
        .unwrap();

        assert_eq!(config.ai.explainer_config().fallback_provider, None);
    }

    #[test]
    fn network_info_builds_explorer_url() {
        let config = Config::try_parse_from([
            "suidigest",
            "--sui-network",
            "testnet",
            "--sui-explorer-url",
            "https://suiscan.xyz/",
        ])
        .unwrap();

        let network = config.sui.network_info();
        assert_eq!(network.explorer_url, "https://suiscan.xyz/testnet");
        assert_eq!(network.name, "Sui testnet");
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(Config::try_parse_from(["suidigest", "--ai-provider", "oracle"]).is_err());
    }
}
