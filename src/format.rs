//! Boundary-only number formatting. Analyzers keep integers; these helpers
//! run when a result is serialized.

use std::fmt::Display;

use serde::Serializer;

/// Inserts `,` every three digits of a decimal integer string, keeping a
/// leading sign: `-201997880` becomes `-201,997,880`.
pub fn group_thousands(decimal: &str) -> String {
    let (sign, digits) = match decimal.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", decimal.strip_prefix('+').unwrap_or(decimal)),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    grouped.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

pub fn serialize_grouped<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.serialize_str(&group_thousands(&value.to_string()))
}
