use std::fmt::Write;

use num_bigint::BigInt;

use crate::balance::BalanceView;
use crate::coins::{scale_amount, CoinRegistry, NATIVE_COIN};
use crate::format::group_thousands;
use crate::gas::GasBreakdown;
use crate::record::TransactionStatus;

pub const SYSTEM_PROMPT: &str = "You explain Sui blockchain transactions to non-technical users. \
Answer in at most four short sentences of plain English. Use only the facts provided; \
do not guess token prices, intentions or identities.";

/// Everything the explainer may tell the model about one transaction.
#[derive(Debug, Clone, Copy)]
pub struct ExplainContext<'a> {
    pub digest: &'a str,
    pub status: TransactionStatus,
    pub summary: &'a str,
    pub gas: &'a GasBreakdown,
    pub balances: &'a BalanceView,
    pub coins: &'a CoinRegistry,
}

/// Builds the user prompt. Same context, same prompt, byte for byte.
pub fn build_prompt(ctx: &ExplainContext<'_>) -> String {
    let native = ctx.coins.lookup(NATIVE_COIN);
    let status = match ctx.status {
        TransactionStatus::Success => "success",
        TransactionStatus::Failure => "failure",
    };

    let mut prompt = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(prompt, "Explain this Sui transaction.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Digest: {}", ctx.digest);
    let _ = writeln!(prompt, "Status: {}", status);
    let _ = writeln!(prompt, "Summary: {}", ctx.summary);
    let _ = writeln!(prompt, "Sender: {}", ctx.balances.participants.sender);
    if ctx.balances.participants.recipients.is_empty() {
        let _ = writeln!(prompt, "Recipients: none");
    } else {
        let _ = writeln!(
            prompt,
            "Recipients: {}",
            ctx.balances.participants.recipients.join(", ")
        );
    }

    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Gas (MIST):");
    for (label, value) in [
        ("computation", ctx.gas.computation_cost.to_string()),
        ("storage", ctx.gas.storage_cost.to_string()),
        ("storage rebate", ctx.gas.storage_rebate.to_string()),
        ("non-refundable storage fee", ctx.gas.non_refundable_storage_fee.to_string()),
        ("total", ctx.gas.total_gas_used.to_string()),
    ] {
        let _ = writeln!(prompt, "- {}: {}", label, group_thousands(&value));
    }
    let _ = writeln!(
        prompt,
        "Total gas in {}: {}",
        native.symbol,
        scale_amount(&BigInt::from(ctx.gas.total_gas_used), native.decimals)
    );

    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Balance changes:");
    if ctx.balances.changes.is_empty() {
        let _ = writeln!(prompt, "- none");
    }
    for change in &ctx.balances.changes {
        let coin = ctx.coins.lookup(&change.coin_type);
        let _ = writeln!(
            prompt,
            "- {}: {} {}",
            change.address,
            scale_amount(&change.amount, coin.decimals),
            coin.symbol
        );
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{analyze_balances, RecipientPolicy};
    use crate::record::RawBalanceChange;
    use serde_json::json;

    fn view() -> BalanceView {
        let raw = [
            RawBalanceChange {
                owner: json!({ "AddressOwner": "0xaaa" }),
                coin_type: "0x2::sui::SUI".to_string(),
                amount: "-201997880".to_string(),
            },
            RawBalanceChange {
                owner: json!({ "AddressOwner": "0xbbb" }),
                coin_type: "0x2::sui::SUI".to_string(),
                amount: "200000000".to_string(),
            },
        ];
        analyze_balances(&raw, Some("0xaaa"), RecipientPolicy::default()).unwrap()
    }

    #[test]
    fn prompt_is_deterministic_and_carries_the_analytics() {
        let gas = GasBreakdown::new(1_000_000, 1_976_000, 978_120, 9_880);
        let balances = view();
        let coins = CoinRegistry::default();
        let ctx = ExplainContext {
            digest: "E2gtnNchwDrLUL7prNSdfcUzwwR4egJV4qpncwHz1hwJ",
            status: TransactionStatus::Success,
            summary: "someone transferred 0.2 SUI",
            gas: &gas,
            balances: &balances,
            coins: &coins,
        };

        let prompt = build_prompt(&ctx);
        assert_eq!(prompt, build_prompt(&ctx));
        assert!(prompt.contains("Summary: someone transferred 0.2 SUI"));
        assert!(prompt.contains("- total: 2,007,760"));
        assert!(prompt.contains("Total gas in SUI: 0.00200776"));
        assert!(prompt.contains(": -0.20199788 SUI"));
        assert!(prompt.contains(&format!("Recipients: {}", balances.participants.recipients[0])));
    }
}
