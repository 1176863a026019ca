//! Technical indicator library.
//!
//! `compute_indicators` augments a daily history with the fixed indicator
//! set used by every strategy:
//! - MA5 / MA20 / MA60 of close and the 5-bar average volume
//! - RSI(14), MACD(12, 26, 9)
//! - OBV and its 10-bar average, MFI(14)
//! - Bollinger Bands(20, 2σ) and normalized band width
//!
//! Values inside an indicator's warm-up window are `None`. Downstream code
//! reads indicators only through `IndicatorPoint::snapshot`, which refuses
//! to hand out a bar with any undefined value.

mod momentum;
mod moving_average;
mod volatility;
mod volume;

pub use momentum::{macd, rsi, MacdSeries};
pub use moving_average::{ema, sma};
pub use volatility::{bollinger, BollingerSeries};
pub use volume::{mfi, obv};

use crate::data::{PriceBar, PriceHistory};
use crate::error::{ScanError, ScanResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Minimum bars required; the longest window is MA60.
pub const WARMUP_BARS: usize = 60;

pub const RSI_PERIOD: usize = 14;
pub const MFI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_WINDOW: usize = 20;
pub const OBV_MA_WINDOW: usize = 10;

/// Indicator values for one bar; `None` inside the warm-up window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub ma5: Option<Decimal>,
    pub ma20: Option<Decimal>,
    pub ma60: Option<Decimal>,
    pub vol_ma5: Option<Decimal>,
    pub rsi14: Option<Decimal>,
    pub macd: Option<Decimal>,
    pub macd_signal: Option<Decimal>,
    pub macd_hist: Option<Decimal>,
    pub obv: Decimal,
    pub obv_ma10: Option<Decimal>,
    pub mfi14: Option<Decimal>,
    pub bb_upper: Option<Decimal>,
    pub bb_lower: Option<Decimal>,
    pub bb_width: Option<Decimal>,
}

/// Fully warmed indicator values for one bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub ma5: Decimal,
    pub ma20: Decimal,
    pub ma60: Decimal,
    pub vol_ma5: Decimal,
    pub rsi14: Decimal,
    pub macd: Decimal,
    pub macd_signal: Decimal,
    pub macd_hist: Decimal,
    pub obv: Decimal,
    pub obv_ma10: Decimal,
    pub mfi14: Decimal,
    pub bb_upper: Decimal,
    pub bb_lower: Decimal,
    pub bb_width: Decimal,
}

fn require(value: Option<Decimal>, indicator: &'static str) -> ScanResult<Decimal> {
    value.ok_or(ScanError::MissingIndicator { indicator })
}

impl IndicatorPoint {
    /// Every indicator on this bar, or `MissingIndicator` naming the first
    /// one still warming up.
    pub fn snapshot(&self) -> ScanResult<IndicatorSnapshot> {
        Ok(IndicatorSnapshot {
            ma5: require(self.ma5, "MA5")?,
            ma20: require(self.ma20, "MA20")?,
            ma60: require(self.ma60, "MA60")?,
            vol_ma5: require(self.vol_ma5, "Vol_MA5")?,
            rsi14: require(self.rsi14, "RSI14")?,
            macd: require(self.macd, "MACD")?,
            macd_signal: require(self.macd_signal, "MACD signal")?,
            macd_hist: require(self.macd_hist, "MACD histogram")?,
            obv: self.obv,
            obv_ma10: require(self.obv_ma10, "OBV_MA10")?,
            mfi14: require(self.mfi14, "MFI14")?,
            bb_upper: require(self.bb_upper, "Bollinger upper")?,
            bb_lower: require(self.bb_lower, "Bollinger lower")?,
            bb_width: require(self.bb_width, "Bollinger width")?,
        })
    }

    /// True once every indicator on this bar is defined.
    pub fn is_warm(&self) -> bool {
        self.snapshot().is_ok()
    }
}

/// A price history with its per-bar indicator values.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSeries {
    history: PriceHistory,
    points: Vec<IndicatorPoint>,
}

/// One bar together with its warmed indicators.
#[derive(Debug, Clone)]
pub struct WarmBar<'a> {
    pub bar: &'a PriceBar,
    pub indicators: IndicatorSnapshot,
}

impl IndicatorSeries {
    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn symbol(&self) -> &str {
        self.history.symbol()
    }

    pub fn bars(&self) -> &[PriceBar] {
        self.history.bars()
    }

    pub fn points(&self) -> &[IndicatorPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent bar and its predecessor, both fully warmed.
    ///
    /// Returns `(latest, previous)`.
    pub fn latest_two(&self) -> ScanResult<(WarmBar<'_>, WarmBar<'_>)> {
        let n = self.points.len();
        if n < 2 {
            return Err(ScanError::InsufficientHistory {
                required: 2,
                actual: n,
            });
        }

        let bars = self.history.bars();
        let latest = WarmBar {
            bar: &bars[n - 1],
            indicators: self.points[n - 1].snapshot()?,
        };
        let previous = WarmBar {
            bar: &bars[n - 2],
            indicators: self.points[n - 2].snapshot()?,
        };

        Ok((latest, previous))
    }
}

/// Compute the full indicator set over a history of at least `WARMUP_BARS` bars.
pub fn compute_indicators(history: &PriceHistory) -> ScanResult<IndicatorSeries> {
    if history.len() < WARMUP_BARS {
        return Err(ScanError::InsufficientHistory {
            required: WARMUP_BARS,
            actual: history.len(),
        });
    }

    let bars = history.bars();
    let closes = history.closes();
    let volumes = history.volumes();

    let ma5 = sma(&closes, 5);
    let ma20 = sma(&closes, 20);
    let ma60 = sma(&closes, 60);
    let vol_ma5 = sma(&volumes, 5);
    let rsi14 = rsi(&closes, RSI_PERIOD);
    let macd_series = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let obv_values = obv(bars);
    let obv_ma10 = sma(&obv_values, OBV_MA_WINDOW);
    let mfi14 = mfi(bars, MFI_PERIOD);
    let bands = bollinger(&closes, BOLLINGER_WINDOW, dec!(2));

    let points = (0..bars.len())
        .map(|i| IndicatorPoint {
            ma5: ma5[i],
            ma20: ma20[i],
            ma60: ma60[i],
            vol_ma5: vol_ma5[i],
            rsi14: rsi14[i],
            macd: macd_series.line[i],
            macd_signal: macd_series.signal[i],
            macd_hist: macd_series.histogram[i],
            obv: obv_values[i],
            obv_ma10: obv_ma10[i],
            mfi14: mfi14[i],
            bb_upper: bands.upper[i],
            bb_lower: bands.lower[i],
            bb_width: bands.width[i],
        })
        .collect();

    Ok(IndicatorSeries {
        history: history.clone(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn test_rejects_short_history() {
        let err = compute_indicators(&fixtures::flat("X", 59)).unwrap_err();
        assert!(matches!(
            err,
            ScanError::InsufficientHistory {
                required: 60,
                actual: 59
            }
        ));
    }

    #[test]
    fn test_defined_after_warmup() {
        for history in [
            fixtures::flat("FLAT", 65),
            fixtures::uptrend("UP", 65),
            fixtures::breakout_spike("SPIKE", 65),
            fixtures::pullback_to_ma20("DIP"),
        ] {
            let series = compute_indicators(&history).unwrap();
            assert!(series.points()[WARMUP_BARS - 1..].iter().all(IndicatorPoint::is_warm));
            assert!(!series.points()[WARMUP_BARS - 2].is_warm());
        }
    }

    #[test]
    fn test_oscillators_bounded() {
        for history in [
            fixtures::flat("FLAT", 65),
            fixtures::uptrend("UP", 65),
            fixtures::breakout_spike("SPIKE", 65),
            fixtures::pullback_to_ma20("DIP"),
        ] {
            let series = compute_indicators(&history).unwrap();
            for point in series.points() {
                for value in [point.rsi14, point.mfi14].into_iter().flatten() {
                    assert!(value >= Decimal::ZERO && value <= dec!(100));
                }
            }
        }
    }

    #[test]
    fn test_flat_series_values() {
        let series = compute_indicators(&fixtures::flat("FLAT", 65)).unwrap();
        let (latest, _) = series.latest_two().unwrap();
        let ind = latest.indicators;

        assert_eq!(ind.rsi14, dec!(100));
        assert_eq!(ind.mfi14, dec!(100));
        assert_eq!(ind.bb_width, Decimal::ZERO);
        assert_eq!(ind.macd_hist, Decimal::ZERO);
        assert_eq!(ind.obv, Decimal::ZERO);
    }

    #[test]
    fn test_uptrend_alignment() {
        let series = compute_indicators(&fixtures::uptrend("UP", 65)).unwrap();
        let (latest, _) = series.latest_two().unwrap();
        let ind = latest.indicators;

        assert!(ind.ma5 > ind.ma20 && ind.ma20 > ind.ma60);
        assert!(ind.obv > ind.obv_ma10);
        assert!(ind.macd > ind.macd_signal);
    }

    #[test]
    fn test_latest_two_requires_warm_predecessor() {
        // 60 bars: the last bar is warm, its predecessor is missing MA60
        let series = compute_indicators(&fixtures::flat("X", 60)).unwrap();
        let err = series.latest_two().unwrap_err();
        assert!(matches!(err, ScanError::MissingIndicator { indicator: "MA60" }));
    }
}
