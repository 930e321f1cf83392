//! Wire model of a finalized transaction as returned by `sui_getTransactionBlock`.
//!
//! Only the fields the interpreter reads are modelled. Everything is owned by
//! the caller and treated as read-only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::normalize_address;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub digest: String,
    #[serde(default)]
    pub transaction: Option<TransactionBlock>,
    pub effects: TransactionEffects,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
    #[serde(default)]
    pub balance_changes: Vec<RawBalanceChange>,
    #[serde(default)]
    pub timestamp_ms: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionBlock {
    pub data: TransactionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub transaction: Option<TransactionKindData>,
}

/// The programmable transaction body. Commands are kept as raw JSON since
/// only `MoveCall` entries are inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionKindData {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub transactions: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub executed_epoch: Option<Value>,
    #[serde(default)]
    pub gas_used: RawGasCost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: TransactionStatus,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failure,
}

/// Gas fields exactly as reported. The node sends decimal strings, but bare
/// JSON integers are accepted too; parsing happens in [`crate::gas`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGasCost {
    #[serde(default)]
    pub computation_cost: Option<Value>,
    #[serde(default)]
    pub storage_cost: Option<Value>,
    #[serde(default)]
    pub storage_rebate: Option<Value>,
    #[serde(default)]
    pub non_refundable_storage_fee: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBalanceChange {
    pub owner: Value,
    pub coin_type: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    #[serde(rename = "type")]
    pub change_type: String,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub owner: Option<Value>,
    #[serde(default)]
    pub recipient: Option<Value>,
}

/// A `MoveCall` command target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCallTarget {
    pub package: String,
    pub module: String,
    pub function: String,
}

impl TransactionRecord {
    pub fn sender(&self) -> Option<&str> {
        self.transaction.as_ref()?.data.sender.as_deref()
    }

    pub fn status(&self) -> TransactionStatus {
        self.effects.status.status
    }

    /// The executed epoch as a decimal string, whichever JSON type carried it.
    pub fn executed_epoch(&self) -> String {
        match &self.effects.executed_epoch {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// The first `MoveCall` command of a programmable transaction.
    pub fn first_move_call(&self) -> Option<MoveCallTarget> {
        let kind = self.transaction.as_ref()?.data.transaction.as_ref()?;
        kind.transactions.iter().find_map(|command| {
            let call = command.get("MoveCall")?;
            Some(MoveCallTarget {
                package: call.get("package")?.as_str()?.to_string(),
                module: call.get("module")?.as_str()?.to_string(),
                function: call.get("function")?.as_str()?.to_string(),
            })
        })
    }
}

impl ObjectChange {
    /// The account an object was handed to: the recipient of a `transferred`
    /// change, or the address owner of a `created` one.
    ///
    /// Objects wrapped under another object (`ObjectOwner`, dynamic fields)
    /// and mutations in place never count.
    pub fn new_address_owner(&self) -> Option<String> {
        let owner = match self.change_type.as_str() {
            "transferred" => self.recipient.as_ref()?,
            "created" => self.owner.as_ref()?,
            _ => return None,
        };
        account_address(owner)
    }
}

/// Like [`owner_address`], but only for owners that are accounts.
pub fn account_address(owner: &Value) -> Option<String> {
    let raw = owner
        .get("AddressOwner")
        .or_else(|| owner.get("ConsensusAddressOwner").and_then(|o| o.get("owner")))?
        .as_str()?;
    normalize_address(raw)
}

/// Extracts the address out of a Sui `Owner` JSON value.
///
/// `Shared` and `Immutable` owners have no address and yield `None`.
pub fn owner_address(owner: &Value) -> Option<String> {
    let raw = owner
        .get("AddressOwner")
        .or_else(|| owner.get("ObjectOwner"))
        .or_else(|| owner.get("ConsensusAddressOwner").and_then(|o| o.get("owner")))
        .or(Some(owner))
        .and_then(Value::as_str)?;
    normalize_address(raw)
}
