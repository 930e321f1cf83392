//! Fetching finalized transactions from a Sui full node.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{InterpretError, Result};
use crate::record::TransactionRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub name: String,
    pub network: String,
    pub rpc_url: String,
    pub explorer_url: String,
}

/// Resolves a transaction digest into a [`TransactionRecord`].
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch(&self, digest: &str) -> Result<TransactionRecord>;
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    message: String,
}

/// JSON-RPC client for `sui_getTransactionBlock`.
pub struct SuiRpcClient {
    http_client: HttpClient,
    network: NetworkInfo,
}

impl SuiRpcClient {
    pub fn new(http_client: HttpClient, network: NetworkInfo) -> Self {
        Self {
            http_client,
            network,
        }
    }
}

#[async_trait]
impl TransactionSource for SuiRpcClient {
    async fn fetch(&self, digest: &str) -> Result<TransactionRecord> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sui_getTransactionBlock",
            "params": [
                digest,
                {
                    "showInput": true,
                    "showEffects": true,
                    "showBalanceChanges": true,
                    "showObjectChanges": true
                }
            ]
        });

        debug!(digest = %digest, rpc_url = %self.network.rpc_url, "fetching transaction");
        let response = self
            .http_client
            .post(&self.network.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Sui RPC request failed: {}", e);
                InterpretError::NodeUnavailable(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InterpretError::NodeUnavailable(format!(
                "node responded with HTTP {}",
                status
            )));
        }

        let body: JsonRpcResponse = response.json().await.map_err(|e| {
            InterpretError::NodeUnavailable(format!("unreadable RPC response: {}", e))
        })?;

        if let Some(error) = body.error {
            if is_not_found(&error.message) {
                return Err(InterpretError::TransactionNotFound(digest.to_string()));
            }
            warn!(code = error.code, "Sui RPC error: {}", error.message);
            return Err(InterpretError::NodeUnavailable(error.message));
        }

        let result = body.result.ok_or_else(|| {
            InterpretError::NodeUnavailable("RPC response carried no result".to_string())
        })?;
        serde_json::from_value(result).map_err(|e| {
            InterpretError::NodeUnavailable(format!("unexpected transaction shape: {}", e))
        })
    }
}

fn is_not_found(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("could not find") || message.contains("not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DIGEST: &str = "E2gtnNchwDrLUL7prNSdfcUzwwR4egJV4qpncwHz1hwJ";

    fn client(server: &MockServer) -> SuiRpcClient {
        SuiRpcClient::new(
            HttpClient::new(),
            NetworkInfo {
                name: "Sui Testnet".to_string(),
                network: "testnet".to_string(),
                rpc_url: server.uri(),
                explorer_url: "https://suiscan.xyz/testnet".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn fetches_transaction_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "sui_getTransactionBlock" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "digest": DIGEST,
                    "transaction": { "data": { "sender": "0xaaa" } },
                    "effects": { "status": { "status": "success" }, "executedEpoch": "7" }
                }
            })))
            .mount(&server)
            .await;

        let record = client(&server).fetch(DIGEST).await.unwrap();
        assert_eq!(record.digest, DIGEST);
        assert_eq!(record.executed_epoch(), "7");
    }

    #[tokio::test]
    async fn unknown_digest_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {
                    "code": -32602,
                    "message": "Could not find the referenced transaction [TransactionDigest(E2gt...)]."
                }
            })))
            .mount(&server)
            .await;

        assert_eq!(
            client(&server).fetch(DIGEST).await.unwrap_err(),
            InterpretError::TransactionNotFound(DIGEST.to_string())
        );
    }

    #[tokio::test]
    async fn gateway_errors_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client(&server).fetch(DIGEST).await.unwrap_err();
        assert!(matches!(err, InterpretError::NodeUnavailable(_)));
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn other_rpc_errors_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32603, "message": "internal error" }
            })))
            .mount(&server)
            .await;

        assert_eq!(
            client(&server).fetch(DIGEST).await.unwrap_err(),
            InterpretError::NodeUnavailable("internal error".to_string())
        );
    }
}
