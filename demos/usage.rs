use clap::Parser;
use suidigest::ai::AiExplainer;
use suidigest::config::Config;
use suidigest::rpc::{SuiRpcClient, TransactionSource};
use suidigest::TransactionInterpreter;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    // Parse command line arguments and environment variables
    let config = Config::parse();

    let http_client = reqwest::Client::new();
    let network = config.sui.network_info();
    let client = SuiRpcClient::new(http_client.clone(), network.clone());

    println!("Network: {} ({})", network.name, network.rpc_url);

    let Ok(digest) = std::env::var("DIGEST") else {
        println!("Set DIGEST to a transaction digest to interpret it.");
        return Ok(());
    };

    let explainer = AiExplainer::from_config(
        &config.ai.explainer_config(),
        &config.ai.provider_settings(),
        http_client,
    );
    let interpreter = TransactionInterpreter::default()
        .with_explainer(explainer)
        .with_explorer_url(network.explorer_url);

    let record = client.fetch(&digest).await?;
    let interpreted = interpreter
        .interpret_with_explanation(&record, &CancellationToken::new())
        .await?;

    println!("\nTransaction {}", interpreted.transaction_digest);
    println!("  Status: {:?}", interpreted.status);
    println!("  Summary: {}", interpreted.summary);
    println!("  Gas: {} MIST", interpreted.gas_used.total_gas_used);
    match (&interpreted.ai_explainer, &interpreted.ai_explainer_error) {
        (Some(text), _) => println!("  AI: {}", text),
        (None, Some(error)) => println!("  AI unavailable ({})", error),
        (None, None) => {}
    }

    Ok(())
}
