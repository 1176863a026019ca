//! Market scanner: fans a universe out over the history provider and ranks
//! the scored instruments.

use super::rules::Strategy;
use super::scoring::{evaluate_series, ScoreResult};
use crate::data::{HistoryProvider, PriceHistory};
use crate::error::{ScanError, ScanResult};
use crate::indicators::{compute_indicators, IndicatorSeries};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

/// Reasons for dropping an instrument from a scan.
#[derive(Debug, Clone, Copy)]
enum SkipReason {
    Unavailable,
    InsufficientHistory,
}

impl From<&ScanError> for SkipReason {
    fn from(err: &ScanError) -> Self {
        if err.is_insufficient_history() {
            SkipReason::InsufficientHistory
        } else {
            SkipReason::Unavailable
        }
    }
}

/// Per-scan settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub strategy: Strategy,
    pub strict: bool,
    /// Maximum in-flight fetches.
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    pub lookback_days: u32,
    /// Keep non-qualifying results (each carries a status note).
    pub bypass_qualification: bool,
}

impl ScanOptions {
    pub fn new(strategy: Strategy, strict: bool) -> Self {
        Self {
            strategy,
            strict,
            concurrency: 8,
            fetch_timeout: Duration::from_secs(15),
            lookback_days: 180,
            bypass_qualification: false,
        }
    }
}

/// Ranked outcome of one scan. Owned by the caller; nothing is cached.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub strategy: Strategy,
    pub strict: bool,
    /// Sorted by score descending, then symbol ascending.
    pub results: Vec<ScoreResult>,
    pub attempted: usize,
    pub qualified: usize,
    pub not_qualified: usize,
    pub skipped_unavailable: usize,
    pub skipped_insufficient: usize,
}

/// Single-instrument view used by the detail command.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub result: ScoreResult,
    pub series: IndicatorSeries,
}

/// Scores every instrument in a universe against one strategy.
pub struct MarketScanner {
    provider: Arc<dyn HistoryProvider>,
    options: ScanOptions,
}

impl MarketScanner {
    pub fn new(provider: Arc<dyn HistoryProvider>, options: ScanOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Fetch, compute, and score every symbol; failures are skipped and
    /// counted rather than aborting the scan.
    #[instrument(skip(self, universe), fields(
        strategy = %self.options.strategy,
        strict = self.options.strict,
        provider = self.provider.name(),
    ))]
    pub async fn scan(&self, universe: &[String]) -> ScanReport {
        let opts = &self.options;
        info!(
            universe = universe.len(),
            concurrency = opts.concurrency,
            "Starting market scan"
        );

        let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
        let mut handles = Vec::with_capacity(universe.len());

        for symbol in universe {
            let sem = semaphore.clone();
            let provider = self.provider.clone();
            let symbol = symbol.clone();
            let opts = opts.clone();

            handles.push(tokio::spawn(async move {
                let outcome = match sem.acquire().await {
                    Ok(_permit) => score_symbol(provider.as_ref(), &symbol, &opts).await,
                    Err(_) => Err(ScanError::unavailable(&symbol, "scan cancelled")),
                };
                (symbol, outcome)
            }));
        }

        let mut results = Vec::new();
        let mut not_qualified = 0usize;
        let mut skipped_unavailable = 0usize;
        let mut skipped_insufficient = 0usize;

        for handle in handles {
            match handle.await {
                Ok((symbol, Ok(result))) => {
                    debug!(
                        symbol = %symbol,
                        score = result.score,
                        qualifies = result.qualifies,
                        "Scored"
                    );
                    if !result.qualifies {
                        not_qualified += 1;
                        if !opts.bypass_qualification {
                            continue;
                        }
                    }
                    results.push(result);
                }
                Ok((symbol, Err(e))) => {
                    warn!(symbol = %symbol, error = %e, "Skipping instrument");
                    match SkipReason::from(&e) {
                        SkipReason::Unavailable => skipped_unavailable += 1,
                        SkipReason::InsufficientHistory => skipped_insufficient += 1,
                    }
                }
                Err(e) => {
                    warn!("Scan task panicked: {}", e);
                    skipped_unavailable += 1;
                }
            }
        }

        results.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        let qualified = results.iter().filter(|r| r.qualifies).count();
        info!(
            attempted = universe.len(),
            qualified,
            not_qualified,
            skipped_unavailable,
            skipped_insufficient,
            "Market scan complete"
        );

        ScanReport {
            strategy: opts.strategy,
            strict: opts.strict,
            results,
            attempted: universe.len(),
            qualified,
            not_qualified,
            skipped_unavailable,
            skipped_insufficient,
        }
    }

    /// Score one symbol regardless of qualification and keep its series.
    ///
    /// Errors surface directly instead of being counted.
    #[instrument(skip(self), fields(strategy = %self.options.strategy))]
    pub async fn inspect(&self, symbol: &str) -> ScanResult<Inspection> {
        let history = fetch(self.provider.as_ref(), symbol, &self.options).await?;
        let series = compute_indicators(&history)?;
        let result = evaluate_series(&series, self.options.strategy, self.options.strict)?;
        Ok(Inspection { result, series })
    }
}

async fn fetch(
    provider: &dyn HistoryProvider,
    symbol: &str,
    opts: &ScanOptions,
) -> ScanResult<PriceHistory> {
    tokio::time::timeout(
        opts.fetch_timeout,
        provider.fetch_history(symbol, opts.lookback_days),
    )
    .await
    .map_err(|_| {
        ScanError::unavailable(
            symbol,
            format!("fetch timed out after {}s", opts.fetch_timeout.as_secs_f64()),
        )
    })?
}

async fn score_symbol(
    provider: &dyn HistoryProvider,
    symbol: &str,
    opts: &ScanOptions,
) -> ScanResult<ScoreResult> {
    let history = fetch(provider, symbol, opts).await?;
    let series = compute_indicators(&history)?;
    evaluate_series(&series, opts.strategy, opts.strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixtures, MockHistoryProvider};

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn provider() -> Arc<MockHistoryProvider> {
        let mock = Arc::new(MockHistoryProvider::new());
        mock.insert(fixtures::uptrend("BBB", 65)).await;
        mock.insert(fixtures::uptrend("AAA", 70)).await;
        mock.insert(fixtures::flat("FLAT", 65)).await;
        mock
    }

    #[tokio::test]
    async fn test_scan_keeps_qualifiers_sorted_with_symbol_tiebreak() {
        let scanner = MarketScanner::new(provider().await, ScanOptions::new(Strategy::Trend, true));
        let report = scanner.scan(&symbols(&["BBB", "FLAT", "AAA"])).await;

        let order: Vec<_> = report.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAA", "BBB"]);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.qualified, 2);
        assert_eq!(report.not_qualified, 1);
        assert!(report.results.iter().all(|r| r.score == 80));
    }

    #[tokio::test]
    async fn test_bypass_keeps_non_qualifying_results() {
        let mut opts = ScanOptions::new(Strategy::Trend, false);
        opts.bypass_qualification = true;
        let scanner = MarketScanner::new(provider().await, opts);
        let report = scanner.scan(&symbols(&["FLAT", "BBB", "AAA"])).await;

        let order: Vec<_> = report.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAA", "BBB", "FLAT"]);
        assert_eq!(report.qualified, 2);

        let flat = &report.results[2];
        assert!(!flat.qualifies);
        assert!(flat.status_note.is_some());
    }

    #[tokio::test]
    async fn test_failures_are_skipped_and_counted() {
        let mock = provider().await;
        mock.fail("BAD", "vendor returned 500").await;
        mock.insert(fixtures::uptrend("SHORT", 40)).await;
        mock.insert(fixtures::uptrend("SIXTY", 60)).await;

        let scanner = MarketScanner::new(mock.clone(), ScanOptions::new(Strategy::Trend, false));
        let report = scanner
            .scan(&symbols(&["AAA", "BAD", "NOPE", "SHORT", "SIXTY"]))
            .await;

        assert_eq!(report.attempted, 5);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.skipped_unavailable, 2);
        assert_eq!(report.skipped_insufficient, 2);
        assert_eq!(mock.fetch_count(), 5);
    }

    #[tokio::test]
    async fn test_fetch_timeout_counts_as_unavailable() {
        let mock = provider().await;
        mock.stall("BBB", Duration::from_secs(30)).await;

        let mut opts = ScanOptions::new(Strategy::Trend, false);
        opts.fetch_timeout = Duration::from_millis(50);
        let scanner = MarketScanner::new(mock, opts);
        let report = scanner.scan(&symbols(&["AAA", "BBB"])).await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].symbol, "AAA");
        assert_eq!(report.skipped_unavailable, 1);
    }

    #[tokio::test]
    async fn test_single_permit_still_scans_everything() {
        let mock = provider().await;
        let mut opts = ScanOptions::new(Strategy::Trend, false);
        opts.concurrency = 1;
        let scanner = MarketScanner::new(mock.clone(), opts);
        let report = scanner.scan(&symbols(&["AAA", "BBB", "FLAT"])).await;

        assert_eq!(report.results.len(), 2);
        assert_eq!(mock.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_universe() {
        let scanner = MarketScanner::new(provider().await, ScanOptions::new(Strategy::Breakout, false));
        let report = scanner.scan(&[]).await;
        assert_eq!(report.attempted, 0);
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn test_inspect_returns_non_qualifying_result_with_series() {
        let scanner = MarketScanner::new(provider().await, ScanOptions::new(Strategy::Breakout, false));
        let inspection = scanner.inspect("FLAT").await.unwrap();

        assert_eq!(inspection.result.score, 10);
        assert!(!inspection.result.qualifies);
        assert_eq!(inspection.series.len(), 65);
    }

    #[tokio::test]
    async fn test_inspect_surfaces_errors() {
        let mock = provider().await;
        mock.insert(fixtures::uptrend("SHORT", 40)).await;
        let scanner = MarketScanner::new(mock, ScanOptions::new(Strategy::Trend, false));

        let err = scanner.inspect("NOPE").await.unwrap_err();
        assert!(matches!(err, ScanError::DataUnavailable { .. }));

        let err = scanner.inspect("SHORT").await.unwrap_err();
        assert!(err.is_insufficient_history());
    }
}
