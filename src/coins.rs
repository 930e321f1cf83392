use std::collections::HashMap;

use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::address::normalize_type_tag;

/// Canonical coin type used for the native coin.
pub const NATIVE_COIN: &str = "SUI";

/// Decimal exponent assumed when nothing better is known.
pub const DEFAULT_DECIMALS: u32 = 9;

lazy_static! {
    static ref NATIVE_TYPE_TAG: String = normalize_type_tag("0x2::sui::SUI");

    static ref WELL_KNOWN_COINS: HashMap<&'static str, (&'static str, u32)> = {
        let mut coins = HashMap::new();
        coins.insert(NATIVE_COIN, ("SUI", 9));
        coins.insert(
            "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
            ("USDC", 6),
        );
        coins.insert(
            "0xc060006111016b8a020ad5b33834984a437aaa7d3c74c18e09a95d48aceab08c::coin::COIN",
            ("USDT", 6),
        );
        coins.insert(
            "0xaf8cd5edc19c4512f4259f0bee101a40d41ebed738ade5874359610ef8eeced5::coin::COIN",
            ("WETH", 8),
        );
        coins.insert(
            "0xdeeb7a4662eec9f2f3def03fb937a663dddaa2e215b8078a284d026b7946c270::deep::DEEP",
            ("DEEP", 6),
        );
        coins.insert(
            "0x356a26eb9e012a68958082340d4c4116e7f55615cf27affcff209cf0ae544f59::wal::WAL",
            ("WAL", 9),
        );
        coins
    };
}

/// Canonical coin type string: `"SUI"` for the native coin, the
/// width-normalized type tag for everything else.
pub fn canonical_coin_type(raw: &str) -> String {
    if raw.trim() == NATIVE_COIN {
        return NATIVE_COIN.to_string();
    }
    let tag = normalize_type_tag(raw);
    if tag == *NATIVE_TYPE_TAG {
        NATIVE_COIN.to_string()
    } else {
        tag
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinInfo {
    pub symbol: String,
    pub decimals: u32,
}

/// Display metadata per canonical coin type.
#[derive(Debug, Clone)]
pub struct CoinRegistry {
    coins: HashMap<String, CoinInfo>,
}

impl Default for CoinRegistry {
    fn default() -> Self {
        let coins = WELL_KNOWN_COINS
            .iter()
            .map(|(coin_type, (symbol, decimals))| {
                (
                    coin_type.to_string(),
                    CoinInfo {
                        symbol: symbol.to_string(),
                        decimals: *decimals,
                    },
                )
            })
            .collect();
        Self { coins }
    }
}

impl CoinRegistry {
    pub fn with_coin(mut self, coin_type: &str, symbol: &str, decimals: u32) -> Self {
        self.coins.insert(
            canonical_coin_type(coin_type),
            CoinInfo {
                symbol: symbol.to_string(),
                decimals,
            },
        );
        self
    }

    /// Unknown types fall back to their type tag as symbol and the native
    /// decimal exponent.
    pub fn lookup(&self, coin_type: &str) -> CoinInfo {
        self.coins.get(coin_type).cloned().unwrap_or_else(|| CoinInfo {
            symbol: coin_type.to_string(),
            decimals: DEFAULT_DECIMALS,
        })
    }
}

/// Renders `amount / 10^decimals` exactly, trimming trailing fractional zeros.
pub fn scale_amount(amount: &BigInt, decimals: u32) -> String {
    let divisor = num_traits::pow(BigInt::from(10u32), decimals as usize);
    let magnitude = amount.abs();
    let whole = &magnitude / &divisor;
    let fraction = &magnitude % &divisor;
    let sign = if amount.is_negative() { "-" } else { "" };

    if fraction.is_zero() {
        return format!("{}{}", sign, whole);
    }

    let padded = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}{}.{}", sign, whole, padded.trim_end_matches('0'))
}
