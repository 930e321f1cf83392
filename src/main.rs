use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use suidigest::ai::AiExplainer;
use suidigest::config::Config;
use suidigest::rpc::SuiRpcClient;
use suidigest::server::{self, AppState};
use suidigest::TransactionInterpreter;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("suidigest=info,tower_http=info")),
        )
        .with_target(true)
        .init();

    // Parse command line arguments and environment variables
    let config = Config::parse();

    let http_client = reqwest::Client::builder()
        .user_agent(concat!("suidigest/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let network = config.sui.network_info();
    let source = Arc::new(SuiRpcClient::new(http_client.clone(), network.clone()));

    let explainer_config = config.ai.explainer_config();
    info!(
        provider = %explainer_config.provider,
        fallback = ?explainer_config.fallback_provider.map(|p| p.to_string()),
        timeout_ms = config.ai.ai_timeout_ms,
        "AI explainer configured"
    );
    let explainer =
        AiExplainer::from_config(&explainer_config, &config.ai.provider_settings(), http_client);
    let interpreter = TransactionInterpreter::default()
        .with_explainer(explainer)
        .with_explorer_url(network.explorer_url.clone());

    let app_state = AppState {
        source,
        interpreter: Arc::new(interpreter),
        network: Arc::new(network),
    };
    let app = server::router(
        app_state,
        Duration::from_millis(config.server.request_timeout_ms),
    );

    let bind_address = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("Server starting on http://{}", bind_address);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
