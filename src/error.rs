use thiserror::Error;

/// Failures that abort a single interpretation request.
///
/// AI provider failures are deliberately absent: those are recovered inside
/// [`crate::ai::AiExplainer`] and only ever surface as `aiExplainerError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    #[error("Malformed gas data: {0}")]
    MalformedGasData(String),

    #[error("Missing or invalid sender address")]
    MissingSenderAddress,

    #[error("Malformed balance change: {0}")]
    MalformedBalanceChange(String),

    #[error("Invalid transaction digest: {0}")]
    InvalidDigest(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Sui node unavailable: {0}")]
    NodeUnavailable(String),

    #[error("Request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Unavailable,
    Cancelled,
}

impl InterpretError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedGasData(_)
            | Self::MissingSenderAddress
            | Self::MalformedBalanceChange(_)
            | Self::InvalidDigest(_) => ErrorCategory::Validation,
            Self::TransactionNotFound(_) => ErrorCategory::NotFound,
            Self::NodeUnavailable(_) => ErrorCategory::Unavailable,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// An error is retriable if the same request may succeed if submitted again.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Unavailable | ErrorCategory::Cancelled
        )
    }
}

pub type Result<T, E = InterpretError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_permanent_and_unavailable_is_transient() {
        let not_found = InterpretError::TransactionNotFound("abc".to_string());
        let unavailable = InterpretError::NodeUnavailable("connection refused".to_string());

        assert_eq!(not_found.category(), ErrorCategory::NotFound);
        assert!(!not_found.is_retriable());
        assert_eq!(unavailable.category(), ErrorCategory::Unavailable);
        assert!(unavailable.is_retriable());
    }

    #[test]
    fn validation_errors_are_not_retriable() {
        for err in [
            InterpretError::MalformedGasData("storageCost".to_string()),
            InterpretError::MissingSenderAddress,
            InterpretError::InvalidDigest("xyz".to_string()),
        ] {
            assert_eq!(err.category(), ErrorCategory::Validation);
            assert!(!err.is_retriable());
        }
    }
}
