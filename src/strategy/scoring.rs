//! Score records and the single-instrument evaluation pipeline.

use super::features::{extract_features, FeatureBundle};
use super::rules::{Signal, Strategy, COMPRESSION_WIDTH};
use crate::data::PriceHistory;
use crate::error::ScanResult;
use crate::indicators::{compute_indicators, IndicatorSeries, IndicatorSnapshot};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Action tier derived from the score alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Watch,
    Accumulate,
    StrongBuy,
}

impl Recommendation {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => Recommendation::StrongBuy,
            s if s >= 60 => Recommendation::Accumulate,
            _ => Recommendation::Watch,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongBuy => write!(f, "strong buy"),
            Recommendation::Accumulate => write!(f, "accumulate"),
            Recommendation::Watch => write!(f, "watch"),
        }
    }
}

/// Bollinger band shape on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandStatus {
    /// Close above the upper band; only reported by the breakout strategy.
    Breakout,
    Compressed,
    Neutral,
}

impl BandStatus {
    fn classify(strategy: Strategy, close: Decimal, indicators: &IndicatorSnapshot) -> Self {
        if strategy == Strategy::Breakout && close > indicators.bb_upper {
            BandStatus::Breakout
        } else if indicators.bb_width < COMPRESSION_WIDTH {
            BandStatus::Compressed
        } else {
            BandStatus::Neutral
        }
    }
}

impl fmt::Display for BandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandStatus::Breakout => write!(f, "breakout"),
            BandStatus::Compressed => write!(f, "compressed"),
            BandStatus::Neutral => write!(f, "neutral"),
        }
    }
}

/// Sign of the MACD histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdPolarity {
    Positive,
    Negative,
    Flat,
}

impl MacdPolarity {
    fn of(histogram: Decimal) -> Self {
        if histogram > Decimal::ZERO {
            MacdPolarity::Positive
        } else if histogram < Decimal::ZERO {
            MacdPolarity::Negative
        } else {
            MacdPolarity::Flat
        }
    }
}

impl fmt::Display for MacdPolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacdPolarity::Positive => write!(f, "+"),
            MacdPolarity::Negative => write!(f, "-"),
            MacdPolarity::Flat => write!(f, "0"),
        }
    }
}

/// OBV-based read of large-holder behaviour. Display only; never scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipStatus {
    /// OBV at or below its 10-bar average.
    Distribution,
    /// OBV above its 10-bar average.
    Accumulation,
    /// Accumulation with OBV above its prior 19-bar high.
    Markup,
}

impl ChipStatus {
    fn classify(features: &FeatureBundle, indicators: &IndicatorSnapshot) -> Self {
        if indicators.obv <= indicators.obv_ma10 {
            ChipStatus::Distribution
        } else if indicators.obv > features.obv_prior_high {
            ChipStatus::Markup
        } else {
            ChipStatus::Accumulation
        }
    }
}

impl fmt::Display for ChipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipStatus::Distribution => write!(f, "distribution"),
            ChipStatus::Accumulation => write!(f, "accumulation"),
            ChipStatus::Markup => write!(f, "markup"),
        }
    }
}

/// Outcome of one (instrument, strategy, strictness) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub symbol: String,
    pub strategy: Strategy,
    pub strict: bool,
    pub score: u32,
    pub signals: Vec<Signal>,
    pub qualifies: bool,
    pub recommendation: Recommendation,
    /// Set when the instrument does not qualify.
    pub status_note: Option<String>,
    pub price: Decimal,
    pub change_pct: Decimal,
    pub rsi: Decimal,
    pub mfi: Decimal,
    pub volume_ratio: Decimal,
    pub band_status: BandStatus,
    pub macd_polarity: MacdPolarity,
    pub chip_status: ChipStatus,
    pub bias_pct: Decimal,
    pub big_holder_price: Decimal,
    pub support_price: Decimal,
}

impl ScoreResult {
    /// Signal labels joined for display.
    pub fn signal_text(&self) -> String {
        self.signals
            .iter()
            .map(Signal::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Score a feature bundle against one strategy.
///
/// `latest` and `previous` are the warmed indicators of the last two bars.
pub fn score(
    symbol: &str,
    features: &FeatureBundle,
    latest: &IndicatorSnapshot,
    previous: &IndicatorSnapshot,
    strategy: Strategy,
    strict: bool,
) -> ScoreResult {
    let eval = strategy.evaluate(features, latest, previous, strict);

    let status_note = (!eval.qualifies).then(|| {
        format!(
            "does not qualify for {strategy} ({} mode, floor {}): score {}",
            if strict { "strict" } else { "loose" },
            strategy.score_floor(strict),
            eval.score
        )
    });

    ScoreResult {
        symbol: symbol.to_string(),
        strategy,
        strict,
        score: eval.score,
        recommendation: Recommendation::from_score(eval.score),
        signals: eval.signals,
        qualifies: eval.qualifies,
        status_note,
        price: features.close,
        change_pct: features.change_pct,
        rsi: latest.rsi14,
        mfi: latest.mfi14,
        volume_ratio: features.volume_ratio,
        band_status: BandStatus::classify(strategy, features.close, latest),
        macd_polarity: MacdPolarity::of(latest.macd_hist),
        chip_status: ChipStatus::classify(features, latest),
        bias_pct: features.bias_pct,
        big_holder_price: features.big_holder_price,
        support_price: features.support_price,
    }
}

/// Score an already-augmented series.
pub fn evaluate_series(
    series: &IndicatorSeries,
    strategy: Strategy,
    strict: bool,
) -> ScanResult<ScoreResult> {
    let features = extract_features(series)?;
    let (latest, previous) = series.latest_two()?;

    Ok(score(
        series.symbol(),
        &features,
        &latest.indicators,
        &previous.indicators,
        strategy,
        strict,
    ))
}

/// Indicators, features and score for a raw history in one call.
pub fn evaluate_history(
    history: &PriceHistory,
    strategy: Strategy,
    strict: bool,
) -> ScanResult<(IndicatorSeries, ScoreResult)> {
    let series = compute_indicators(history)?;
    let result = evaluate_series(&series, strategy, strict)?;
    Ok((series, result))
}
