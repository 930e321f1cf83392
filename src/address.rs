//! Canonical forms for Sui addresses, type tags and transaction digests.

use crate::error::{InterpretError, Result};

/// Hex characters in a full-width Sui address (32 bytes).
pub const ADDRESS_HEX_LEN: usize = 64;

const DIGEST_LEN: usize = 32;

/// Normalizes an address to lowercase, `0x`-prefixed, 64-hex-digit form.
///
/// Short forms such as `0x2` are left-padded with zeros. Returns `None` for
/// anything that is not address-shaped.
pub fn normalize_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > ADDRESS_HEX_LEN {
        return None;
    }

    let padded = format!("{:0>width$}", digits.to_ascii_lowercase(), width = ADDRESS_HEX_LEN);
    hex::decode(&padded).ok()?;
    Some(format!("0x{}", padded))
}

/// Rewrites every address inside a Move type tag into canonical width,
/// e.g. `0x2::coin::Coin<0x2::sui::SUI>` becomes
/// `0x000…002::coin::Coin<0x000…002::sui::SUI>`.
pub fn normalize_type_tag(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + ADDRESS_HEX_LEN);
    let mut rest = raw.trim();
    let mut prev: Option<char> = None;

    while let Some(c) = rest.chars().next() {
        let at_token_start = matches!(prev, None | Some('<' | ',' | ' '));
        if at_token_start && rest.starts_with("0x") {
            let end = rest[2..]
                .find(|c: char| !c.is_ascii_hexdigit())
                .map_or(rest.len(), |n| n + 2);
            let (address, tail) = rest.split_at(end);
            match normalize_address(address) {
                Some(normalized) if tail.starts_with("::") => out.push_str(&normalized),
                _ => out.push_str(address),
            }
            prev = address.chars().last();
            rest = tail;
        } else {
            out.push(c);
            prev = Some(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}

/// Checks the shape of a transaction digest: base58 decoding to 32 bytes.
pub fn validate_digest(digest: &str) -> Result<()> {
    match bs58::decode(digest).into_vec() {
        Ok(bytes) if bytes.len() == DIGEST_LEN => Ok(()),
        Ok(bytes) => Err(InterpretError::InvalidDigest(format!(
            "expected {} bytes, got {}",
            DIGEST_LEN,
            bytes.len()
        ))),
        Err(e) => Err(InterpretError::InvalidDigest(e.to_string())),
    }
}
