//! Synthetic histories shared by unit tests.

use super::types::{PriceBar, PriceHistory};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64)
}

/// Build bars from closes and volumes; each bar opens at the prior close.
pub fn from_closes(symbol: &str, closes: &[Decimal], volumes: &[Decimal]) -> PriceHistory {
    assert_eq!(closes.len(), volumes.len());
    let bars = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar::new(day(i), open, open.max(close), open.min(close), close, volume)
        })
        .collect();
    PriceHistory::new(symbol, bars).unwrap()
}

/// Replace bars and rebuild the history.
pub fn with_bars(history: &PriceHistory, f: impl FnOnce(&mut Vec<PriceBar>)) -> PriceHistory {
    let mut bars = history.bars().to_vec();
    f(&mut bars);
    PriceHistory::new(history.symbol(), bars).unwrap()
}

/// open = high = low = close = 100, constant volume.
pub fn flat(symbol: &str, n: usize) -> PriceHistory {
    let bars = (0..n)
        .map(|i| PriceBar::new(day(i), dec!(100), dec!(100), dec!(100), dec!(100), dec!(1000)))
        .collect();
    PriceHistory::new(symbol, bars).unwrap()
}

/// Geometric 1%-per-bar uptrend with steady volume.
pub fn uptrend(symbol: &str, n: usize) -> PriceHistory {
    let mut close = dec!(100);
    let mut closes = Vec::with_capacity(n);
    for _ in 0..n {
        closes.push(close);
        close = (close * dec!(1.01)).round_dp(4);
    }
    from_closes(symbol, &closes, &vec![dec!(1000); n])
}

/// Flat at 100 for `n - 1` bars, then a close of 110 on triple volume.
pub fn breakout_spike(symbol: &str, n: usize) -> PriceHistory {
    let mut closes = vec![dec!(100); n];
    let mut volumes = vec![dec!(1000); n];
    closes[n - 1] = dec!(110);
    volumes[n - 1] = dec!(3000);
    from_closes(symbol, &closes, &volumes)
}

/// 30-bar climb from 85 to 99.5, then 100/101 chop for the remaining bars,
/// ending on 100.
pub fn pullback_to_ma20(symbol: &str) -> PriceHistory {
    let mut closes: Vec<Decimal> = (0..30).map(|i| dec!(85) + dec!(0.5) * Decimal::from(i)).collect();
    for i in 0..35 {
        closes.push(if i % 2 == 0 { dec!(100) } else { dec!(101) });
    }
    let volumes = vec![dec!(1000); closes.len()];
    from_closes(symbol, &closes, &volumes)
}
