//! In-memory history provider for dry runs and tests.

use super::traits::HistoryProvider;
use super::types::PriceHistory;
use crate::error::{ScanError, ScanResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
enum MockEntry {
    History(PriceHistory),
    Failure(String),
}

/// Serves preloaded histories; symbols can be set to fail or to stall.
#[derive(Debug, Default)]
pub struct MockHistoryProvider {
    entries: RwLock<HashMap<String, MockEntry>>,
    delays: RwLock<HashMap<String, Duration>>,
    fetch_count: AtomicU64,
}

impl MockHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a history under its own symbol.
    pub async fn insert(&self, history: PriceHistory) {
        self.entries
            .write()
            .await
            .insert(history.symbol().to_string(), MockEntry::History(history));
    }

    /// Make every fetch of `symbol` fail with `DataUnavailable`.
    pub async fn fail(&self, symbol: &str, reason: &str) {
        self.entries
            .write()
            .await
            .insert(symbol.to_string(), MockEntry::Failure(reason.to_string()));
    }

    /// Delay every fetch of `symbol` (used to exercise fetch timeouts).
    pub async fn stall(&self, symbol: &str, delay: Duration) {
        self.delays.write().await.insert(symbol.to_string(), delay);
    }

    /// Number of fetches served so far, successful or not.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HistoryProvider for MockHistoryProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_history(&self, symbol: &str, lookback_days: u32) -> ScanResult<PriceHistory> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);

        let delay = self.delays.read().await.get(symbol).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let entry = self.entries.read().await.get(symbol).cloned();
        debug!(symbol, lookback_days, found = entry.is_some(), "Mock fetch");

        match entry {
            Some(MockEntry::History(history)) => Ok(history),
            Some(MockEntry::Failure(reason)) => Err(ScanError::unavailable(symbol, reason)),
            None => Err(ScanError::unavailable(symbol, "unknown symbol")),
        }
    }
}
