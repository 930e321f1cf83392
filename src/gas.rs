use serde::Serialize;
use serde_json::Value;

use crate::error::{InterpretError, Result};
use crate::format::serialize_grouped;
use crate::record::RawGasCost;

/// Decomposition of the fee charged for a transaction, in MIST.
///
/// `total_gas_used` is always derived from the other four fields and may be
/// negative when the storage rebate exceeds what was charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasBreakdown {
    #[serde(serialize_with = "serialize_grouped")]
    pub computation_cost: u64,
    #[serde(serialize_with = "serialize_grouped")]
    pub storage_cost: u64,
    #[serde(serialize_with = "serialize_grouped")]
    pub storage_rebate: u64,
    #[serde(serialize_with = "serialize_grouped")]
    pub non_refundable_storage_fee: u64,
    #[serde(serialize_with = "serialize_grouped")]
    pub total_gas_used: i128,
}

impl GasBreakdown {
    pub fn new(
        computation_cost: u64,
        storage_cost: u64,
        storage_rebate: u64,
        non_refundable_storage_fee: u64,
    ) -> Self {
        let total_gas_used = computation_cost as i128 + storage_cost as i128
            - storage_rebate as i128
            + non_refundable_storage_fee as i128;

        Self {
            computation_cost,
            storage_cost,
            storage_rebate,
            non_refundable_storage_fee,
            total_gas_used,
        }
    }
}

/// Builds a [`GasBreakdown`] from the raw effects fields.
///
/// Any missing or non-numeric field fails the whole breakdown; no partial
/// result is ever produced.
pub fn analyze_gas(raw: &RawGasCost) -> Result<GasBreakdown> {
    Ok(GasBreakdown::new(
        parse_field("computationCost", raw.computation_cost.as_ref())?,
        parse_field("storageCost", raw.storage_cost.as_ref())?,
        parse_field("storageRebate", raw.storage_rebate.as_ref())?,
        parse_field("nonRefundableStorageFee", raw.non_refundable_storage_fee.as_ref())?,
    ))
}

fn parse_field(name: &str, value: Option<&Value>) -> Result<u64> {
    let parsed = match value {
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(Value::Number(n)) => n.as_u64(),
        Some(_) => None,
        None => {
            return Err(InterpretError::MalformedGasData(format!("{} is missing", name)));
        }
    };

    parsed.ok_or_else(|| {
        InterpretError::MalformedGasData(format!("{} is not a non-negative integer", name))
    })
}
