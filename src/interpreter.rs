use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ai::{AiExplainer, ExplainContext, Explanation};
use crate::balance::{analyze_balances, BalanceChange, BalanceView, Participants, RecipientPolicy};
use crate::coins::CoinRegistry;
use crate::error::{InterpretError, Result};
use crate::gas::{analyze_gas, GasBreakdown};
use crate::record::{TransactionRecord, TransactionStatus};
use crate::summary::{classify, summarize};

const EXPLAINER_NOT_CONFIGURED: &str = "AI explanation is not configured";

/// The structured interpretation of one transaction, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretedTransaction {
    pub transaction_digest: String,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_error: Option<String>,
    pub executed_epoch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_explainer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_explainer_error: Option<String>,
    pub gas_used: GasBreakdown,
    pub participants: Participants,
    pub balance_changes: Vec<BalanceChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

struct Analysis {
    gas: GasBreakdown,
    balances: BalanceView,
    summary: String,
}

/// Sequences gas analysis, balance analysis, summary generation and the
/// optional AI explanation for one fetched transaction.
pub struct TransactionInterpreter {
    coins: CoinRegistry,
    policy: RecipientPolicy,
    explainer: Option<AiExplainer>,
    explorer_url: Option<String>,
}

impl Default for TransactionInterpreter {
    fn default() -> Self {
        Self::new(CoinRegistry::default())
    }
}

impl TransactionInterpreter {
    pub fn new(coins: CoinRegistry) -> Self {
        Self {
            coins,
            policy: RecipientPolicy::default(),
            explainer: None,
            explorer_url: None,
        }
    }

    pub fn with_policy(mut self, policy: RecipientPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_explainer(mut self, explainer: AiExplainer) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Explorer base URL, e.g. `https://suiscan.xyz/mainnet`.
    pub fn with_explorer_url(mut self, explorer_url: impl Into<String>) -> Self {
        self.explorer_url = Some(explorer_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Summary and analytics only; makes no outbound calls.
    pub fn interpret(&self, record: &TransactionRecord) -> Result<InterpretedTransaction> {
        let analysis = self.analyze(record)?;
        Ok(self.assemble(record, analysis, Explanation::default()))
    }

    /// Like [`Self::interpret`], plus an AI explanation. Provider failures
    /// land in `ai_explainer_error`; only cancellation aborts the call.
    pub async fn interpret_with_explanation(
        &self,
        record: &TransactionRecord,
        cancel: &CancellationToken,
    ) -> Result<InterpretedTransaction> {
        let analysis = self.analyze(record)?;

        let explanation = match &self.explainer {
            Some(explainer) => {
                let ctx = ExplainContext {
                    digest: &record.digest,
                    status: record.status(),
                    summary: &analysis.summary,
                    gas: &analysis.gas,
                    balances: &analysis.balances,
                    coins: &self.coins,
                };
                explainer
                    .explain(&ctx, cancel)
                    .await
                    .ok_or(InterpretError::Cancelled)?
            }
            None => Explanation {
                text: None,
                error: Some(EXPLAINER_NOT_CONFIGURED.to_string()),
            },
        };

        Ok(self.assemble(record, analysis, explanation))
    }

    fn analyze(&self, record: &TransactionRecord) -> Result<Analysis> {
        // Independent of each other; both must succeed before summarizing.
        let gas = analyze_gas(&record.effects.gas_used)?;
        let balances = analyze_balances(&record.balance_changes, record.sender(), self.policy)?;

        let kind = classify(record, &balances);
        let summary = summarize(&kind, &balances, &self.coins);
        debug!(digest = %record.digest, ?kind, "interpreted transaction");

        Ok(Analysis {
            gas,
            balances,
            summary,
        })
    }

    fn assemble(
        &self,
        record: &TransactionRecord,
        analysis: Analysis,
        explanation: Explanation,
    ) -> InterpretedTransaction {
        InterpretedTransaction {
            transaction_digest: record.digest.clone(),
            status: record.status(),
            status_error: record.effects.status.error.clone(),
            executed_epoch: record.executed_epoch(),
            timestamp: record
                .timestamp_ms
                .as_deref()
                .and_then(|ms| ms.parse::<i64>().ok())
                .and_then(DateTime::from_timestamp_millis),
            summary: analysis.summary,
            ai_explainer: explanation.text,
            ai_explainer_error: explanation.error,
            gas_used: analysis.gas,
            participants: analysis.balances.participants,
            balance_changes: analysis.balances.changes,
            explorer_url: self
                .explorer_url
                .as_ref()
                .map(|base| format!("{}/tx/{}", base, record.digest)),
        }
    }
}
