//! Rule-based, deterministic one-line summaries.

use num_bigint::BigInt;
use num_traits::Signed;

use crate::balance::BalanceView;
use crate::coins::{scale_amount, CoinRegistry};
use crate::record::{MoveCallTarget, TransactionRecord};

const CLAUSE_SEPARATOR: &str = ", ";

/// Coarse shape of a transaction, used to pick a summary template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    /// One coin type moved to one recipient.
    CoinTransfer,
    /// Several coin types and/or several recipients.
    MultiTransfer,
    /// No coins reached anyone but the sender.
    MoveCall(MoveCallTarget),
    ObjectTransfer {
        description: String,
        recipient: String,
    },
    Other,
}

/// One `(recipient, coin)` pair of a transfer, summed over that pair's
/// positive entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub recipient: String,
    pub coin_type: String,
    pub amount: BigInt,
}

/// Groups the recipients' positive entries by `(recipient, coin)`, in the
/// order the balance changes were received.
pub fn transfers(view: &BalanceView) -> Vec<Transfer> {
    let mut transfers: Vec<Transfer> = Vec::new();
    let recipients = &view.participants.recipients;

    for change in view.changes.iter().filter(|c| c.amount.is_positive()) {
        if !recipients.contains(&change.address) {
            continue;
        }
        match transfers
            .iter_mut()
            .find(|t| t.recipient == change.address && t.coin_type == change.coin_type)
        {
            Some(transfer) => transfer.amount += &change.amount,
            None => transfers.push(Transfer {
                recipient: change.address.clone(),
                coin_type: change.coin_type.clone(),
                amount: change.amount.clone(),
            }),
        }
    }

    transfers
}

/// Picks a [`TransactionKind`] from the balance view and the record's object
/// changes and commands.
pub fn classify(record: &TransactionRecord, view: &BalanceView) -> TransactionKind {
    let sender = &view.participants.sender;

    let objects: Vec<_> = record
        .object_changes
        .iter()
        .filter(|change| {
            change
                .object_type
                .as_deref()
                .is_some_and(|t| !is_coin_object(t) && !is_dynamic_field(t))
        })
        .filter_map(|change| Some((change, change.new_address_owner()?)))
        .filter(|(_, owner)| owner != sender)
        .collect();

    if let Some((first, recipient)) = objects.first() {
        let name = object_name(first.object_type.as_deref().unwrap_or_default());
        let description = match (objects.len(), first.object_id.as_deref()) {
            (1, Some(id)) => format!("{} {}", name, id),
            (1, None) => name.to_string(),
            (n, _) => format!("{} and {} other object(s)", name, n - 1),
        };
        return TransactionKind::ObjectTransfer {
            description,
            recipient: recipient.clone(),
        };
    }

    match transfers(view).len() {
        0 => record
            .first_move_call()
            .map(TransactionKind::MoveCall)
            .unwrap_or(TransactionKind::Other),
        1 => TransactionKind::CoinTransfer,
        _ => TransactionKind::MultiTransfer,
    }
}

/// Renders the summary for an already classified transaction.
///
/// Pure: identical inputs always produce a byte-identical string.
pub fn summarize(kind: &TransactionKind, view: &BalanceView, coins: &CoinRegistry) -> String {
    let sender = &view.participants.sender;

    match kind {
        TransactionKind::CoinTransfer | TransactionKind::MultiTransfer => {
            let clauses: Vec<String> = transfers(view)
                .iter()
                .map(|t| {
                    let coin = coins.lookup(&t.coin_type);
                    format!(
                        "{} {} to {}",
                        scale_amount(&t.amount, coin.decimals),
                        coin.symbol,
                        t.recipient
                    )
                })
                .collect();
            if clauses.is_empty() {
                format!("{} executed a transaction with no transfers", sender)
            } else {
                format!("{} transferred {}", sender, clauses.join(CLAUSE_SEPARATOR))
            }
        }
        TransactionKind::MoveCall(target) => {
            format!("{} called {}::{}", sender, target.module, target.function)
        }
        TransactionKind::ObjectTransfer {
            description,
            recipient,
        } => format!("{} transferred {} to {}", sender, description, recipient),
        TransactionKind::Other => {
            format!("{} executed a transaction with no transfers", sender)
        }
    }
}

fn is_coin_object(object_type: &str) -> bool {
    object_type.contains("::coin::Coin<")
}

fn is_dynamic_field(object_type: &str) -> bool {
    object_type.contains("::dynamic_field::Field<")
        || object_type.contains("::dynamic_object_field::Wrapper<")
}

/// `0x..::nft::DevNetNFT<0x..::x::Y>` becomes `DevNetNFT`.
fn object_name(object_type: &str) -> &str {
    let base = object_type.split('<').next().unwrap_or(object_type);
    base.rsplit("::").next().unwrap_or(base)
}
