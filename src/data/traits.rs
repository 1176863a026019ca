//! Source-agnostic trait for daily price history.
//!
//! The scanner only needs one thing from a market-data source: the recent
//! daily bars for a symbol. Anything else (caching, retries, auth) lives
//! behind the implementation.

use super::types::PriceHistory;
use crate::error::ScanResult;
use async_trait::async_trait;

/// Trait for sources that deliver daily OHLCV history.
///
/// Implementations must map network errors and unknown symbols to
/// `ScanError::DataUnavailable`. A short series (holiday gaps, fresh
/// listings) is returned as-is rather than treated as a failure.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Fetch up to `lookback_days` calendar days of history, ending at the
    /// most recent bar the source has.
    async fn fetch_history(&self, symbol: &str, lookback_days: u32) -> ScanResult<PriceHistory>;
}
