//! CSV-backed history provider.
//!
//! Reads one file per symbol from a directory:
//! ```csv
//! date,open,high,low,close,volume
//! 2024-01-02,580.0,593.0,578.0,593.0,23871000
//! ```

use super::traits::HistoryProvider;
use super::types::{PriceBar, PriceHistory};
use crate::error::{ScanError, ScanResult};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads `<dir>/<SYMBOL>.csv` on every fetch.
#[derive(Debug, Clone)]
pub struct CsvHistoryProvider {
    dir: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    /// Parse CSV content into a validated history.
    pub fn parse(symbol: &str, content: &str) -> ScanResult<PriceHistory> {
        let mut bars = Vec::new();

        for (line_num, line) in content.lines().enumerate() {
            // Skip header
            if line_num == 0 && line.trim_start().starts_with("date") {
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            let bar = parse_row(line).map_err(|reason| {
                ScanError::InvalidHistory(format!("{symbol} line {}: {reason}", line_num + 1))
            })?;
            bars.push(bar);
        }

        PriceHistory::new(symbol, bars)
    }
}

fn parse_row(line: &str) -> Result<PriceBar, String> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 6 {
        return Err(format!(
            "expected 6 columns (date,open,high,low,close,volume), got {}",
            parts.len()
        ));
    }

    let date = NaiveDate::parse_from_str(parts[0], "%Y-%m-%d")
        .map_err(|e| format!("invalid date {:?}: {e}", parts[0]))?;
    let num = |idx: usize, name: &str| -> Result<Decimal, String> {
        parts[idx]
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(parts[idx]))
            .map_err(|e| format!("invalid {name} {:?}: {e}", parts[idx]))
    };

    Ok(PriceBar {
        date,
        open: num(1, "open")?,
        high: num(2, "high")?,
        low: num(3, "low")?,
        close: num(4, "close")?,
        volume: num(5, "volume")?,
    })
}

#[async_trait]
impl HistoryProvider for CsvHistoryProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_history(&self, symbol: &str, lookback_days: u32) -> ScanResult<PriceHistory> {
        let path = self.path_for(symbol);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ScanError::unavailable(symbol, format!("{}: {e}", path.display())))?;

        let history = Self::parse(symbol, &content)?;
        let Some(last) = history.latest() else {
            return Ok(history);
        };

        let cutoff = last.date - Duration::days(i64::from(lookback_days));
        let keep = history.bars().iter().filter(|b| b.date > cutoff).count();
        debug!(
            symbol,
            total = history.len(),
            kept = keep,
            lookback_days,
            "Loaded CSV history"
        );

        Ok(history.tail(keep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = "date,open,high,low,close,volume\n\
        2024-01-02,50,56,49,54,1000\n\
        2024-01-03,54,55,53,54.5,1.2e3\n\
        \n\
        2024-03-01,54.5,57,54,56,900\n";

    #[test]
    fn test_parse_sample() {
        let history = CsvHistoryProvider::parse("2330.TW", SAMPLE).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.bars()[0].close, dec!(54));
        assert_eq!(history.bars()[1].volume, dec!(1200));
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let err = CsvHistoryProvider::parse("X", "2024-01-02,1,2,3\n").unwrap_err();
        assert!(matches!(err, ScanError::InvalidHistory(_)));
    }

    #[tokio::test]
    async fn test_fetch_applies_lookback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2330.TW.csv"), SAMPLE).unwrap();

        let provider = CsvHistoryProvider::new(dir.path());
        let history = provider.fetch_history("2330.TW", 30).await.unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().close, dec!(56));
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvHistoryProvider::new(dir.path());

        let err = provider.fetch_history("NOPE", 180).await.unwrap_err();
        assert!(matches!(err, ScanError::DataUnavailable { .. }));
    }
}
