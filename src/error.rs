//! Error taxonomy for the scoring engine and scan orchestrator.
//!
//! Division guards (zero average volume, zero average loss, zero MA20,
//! zero prior close) are not errors: they resolve to neutral values inside
//! the indicator and feature code.

use thiserror::Error;

/// Errors raised while loading history or scoring an instrument.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The history is shorter than the longest indicator warm-up window.
    #[error("insufficient history: need at least {required} bars, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// An indicator needed on the evaluated bar is still inside its warm-up window.
    #[error("insufficient history: {indicator} is undefined on the evaluated bar")]
    MissingIndicator { indicator: &'static str },

    /// The history provider could not deliver data for the symbol.
    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// The bars violate ordering or sign constraints.
    #[error("invalid price history: {0}")]
    InvalidHistory(String),
}

impl ScanError {
    /// Create a `DataUnavailable` error for a symbol.
    pub fn unavailable(symbol: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }

    /// True for both flavours of "not enough warmed-up bars".
    pub fn is_insufficient_history(&self) -> bool {
        matches!(
            self,
            Self::InsufficientHistory { .. } | Self::MissingIndicator { .. }
        )
    }
}

/// Result alias used across the library.
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_indicator_counts_as_insufficient_history() {
        let err = ScanError::MissingIndicator { indicator: "MA60" };
        assert!(err.is_insufficient_history());
        assert!(err.to_string().contains("MA60"));
    }

    #[test]
    fn test_unavailable_message() {
        let err = ScanError::unavailable("2330.TW", "connection reset");
        assert!(!err.is_insufficient_history());
        assert_eq!(
            err.to_string(),
            "data unavailable for 2330.TW: connection reset"
        );
    }
}
