//! Point-in-time features for the most recent bar.

use crate::error::ScanResult;
use crate::indicators::IndicatorSeries;
use crate::utils::decimal::{percent_change, safe_div};
use rust_decimal::Decimal;
use serde::Serialize;

/// Number of trailing bars searched for the heaviest-volume session.
pub const BIG_HOLDER_WINDOW: usize = 20;

/// Bars before the latest one searched for the prior OBV high.
pub const OBV_HIGH_LOOKBACK: usize = 19;

/// Scalar features derived from the latest bar and its predecessor.
///
/// Built fresh for every evaluation; never cached across instruments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureBundle {
    pub close: Decimal,
    pub prev_close: Decimal,
    /// Daily change in percent; 0 when the prior close is 0.
    pub change_pct: Decimal,
    /// `volume / Vol_MA5`; 0 when the average volume is 0.
    pub volume_ratio: Decimal,
    /// `(close - MA20) / MA20 * 100`; 0 when MA20 is 0.
    pub bias_pct: Decimal,
    pub band_width: Decimal,
    /// Body midpoint of the max-volume bar in the trailing 20 bars.
    pub big_holder_price: Decimal,
    /// Current MA20.
    pub support_price: Decimal,
    /// Highest OBV over the 19 bars before the latest one.
    pub obv_prior_high: Decimal,
}

/// Extract the feature bundle from a series whose last two bars are warm.
pub fn extract_features(series: &IndicatorSeries) -> ScanResult<FeatureBundle> {
    let (latest, previous) = series.latest_two()?;
    let ind = &latest.indicators;

    let close = latest.bar.close;
    let prev_close = previous.bar.close;

    Ok(FeatureBundle {
        close,
        prev_close,
        change_pct: percent_change(prev_close, close),
        volume_ratio: safe_div(latest.bar.volume, ind.vol_ma5),
        bias_pct: percent_change(ind.ma20, close),
        band_width: ind.bb_width,
        big_holder_price: big_holder_price(series),
        support_price: ind.ma20,
        obv_prior_high: obv_prior_high(series),
    })
}

/// `(open + close) / 2` of the heaviest-volume bar among the trailing 20.
///
/// Ties resolve to the most recent bar (`Iterator::max_by` keeps the last
/// maximum).
fn big_holder_price(series: &IndicatorSeries) -> Decimal {
    let bars = series.bars();
    let start = bars.len().saturating_sub(BIG_HOLDER_WINDOW);

    bars[start..]
        .iter()
        .max_by(|a, b| a.volume.cmp(&b.volume))
        .map(|bar| bar.body_mid())
        .unwrap_or(Decimal::ZERO)
}

fn obv_prior_high(series: &IndicatorSeries) -> Decimal {
    let points = series.points();
    let end = points.len().saturating_sub(1);
    let start = end.saturating_sub(OBV_HIGH_LOOKBACK);

    points[start..end]
        .iter()
        .map(|p| p.obv)
        .max()
        .unwrap_or(Decimal::ZERO)
}
