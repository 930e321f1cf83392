use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::Signed;
use serde::Serialize;

use crate::address::normalize_address;
use crate::coins::canonical_coin_type;
use crate::error::{InterpretError, Result};
use crate::format::serialize_grouped;
use crate::record::{owner_address, RawBalanceChange};

/// A signed delta in one address's holdings of one coin type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    pub address: String,
    #[serde(serialize_with = "serialize_grouped")]
    pub amount: BigInt,
    pub coin_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participants {
    pub sender: String,
    pub recipients: Vec<String>,
}

/// Which balance movements make an address a recipient.
///
/// Neither policy ever classifies the sender as a recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipientPolicy {
    /// Any single entry with a strictly positive amount, for any coin type.
    /// An address that nets negative overall but has one incidental positive
    /// line item still counts.
    #[default]
    AnyPositiveEntry,
    /// The summed delta for at least one coin type is strictly positive.
    NetPositivePerCoin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceView {
    /// Every entry in the order the node reported it; never merged.
    pub changes: Vec<BalanceChange>,
    pub participants: Participants,
}

/// Canonicalizes raw balance changes and classifies the participants.
///
/// Amounts are reported exactly as received: conservation per coin type is
/// not assumed, since mints and burns legitimately break it. Entries whose
/// owner carries no address (`Shared`, `Immutable`) cannot be attributed to
/// a participant and are left out; every other entry keeps its position.
pub fn analyze_balances(
    raw_changes: &[RawBalanceChange],
    sender: Option<&str>,
    policy: RecipientPolicy,
) -> Result<BalanceView> {
    let sender = sender
        .and_then(normalize_address)
        .ok_or(InterpretError::MissingSenderAddress)?;

    let mut changes = Vec::with_capacity(raw_changes.len());
    for raw in raw_changes {
        let Some(address) = owner_address(&raw.owner) else {
            tracing::warn!(
                owner = %raw.owner,
                coin_type = %raw.coin_type,
                "skipping balance change without an address owner"
            );
            continue;
        };
        let amount = BigInt::from_str(raw.amount.trim()).map_err(|_| {
            InterpretError::MalformedBalanceChange(format!(
                "amount {:?} for {} is not an integer",
                raw.amount, address
            ))
        })?;

        changes.push(BalanceChange {
            address,
            amount,
            coin_type: canonical_coin_type(&raw.coin_type),
        });
    }

    let recipients = classify_recipients(&changes, &sender, policy);

    Ok(BalanceView {
        changes,
        participants: Participants { sender, recipients },
    })
}

fn classify_recipients(
    changes: &[BalanceChange],
    sender: &str,
    policy: RecipientPolicy,
) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    let mut push = |address: &str| {
        if address != sender && !recipients.iter().any(|r| r == address) {
            recipients.push(address.to_string());
        }
    };

    match policy {
        RecipientPolicy::AnyPositiveEntry => {
            for change in changes.iter().filter(|c| c.amount.is_positive()) {
                push(&change.address);
            }
        }
        RecipientPolicy::NetPositivePerCoin => {
            for (address, _, total) in net_deltas(changes) {
                if total.is_positive() {
                    push(&address);
                }
            }
        }
    }

    recipients
}

/// Net delta per `(address, coin type)`, in first-seen order.
fn net_deltas(changes: &[BalanceChange]) -> Vec<(String, String, BigInt)> {
    let mut totals: Vec<(String, String, BigInt)> = Vec::new();
    for change in changes {
        match totals
            .iter_mut()
            .find(|(address, coin, _)| *address == change.address && *coin == change.coin_type)
        {
            Some((_, _, total)) => *total += &change.amount,
            None => totals.push((
                change.address.clone(),
                change.coin_type.clone(),
                change.amount.clone(),
            )),
        }
    }
    totals
}
