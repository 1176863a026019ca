//! Strategy rule sets.
//!
//! Each strategy is an additive list of point rules evaluated in a fixed
//! order. Strict mode only raises qualification thresholds; point values
//! never change.

use super::features::FeatureBundle;
use crate::indicators::IndicatorSnapshot;
use crate::utils::decimal::relative_distance;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Volume ratio that earns the breakout surge points.
const BREAKOUT_SURGE_RATIO: Decimal = dec!(1.5);
/// Band width below which the bands count as compressed.
pub const COMPRESSION_WIDTH: Decimal = dec!(0.15);
/// Max relative distance from MA20 that counts as a retest.
const RETEST_DISTANCE: Decimal = dec!(0.03);

/// Scoring mode. Mutually exclusive per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Volume and volatility expansion out of a tight range.
    Breakout,
    /// Aligned moving averages with accumulation.
    Trend,
    /// Pullbacks to the 20-day average inside a longer uptrend.
    ValueDip,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Breakout, Strategy::Trend, Strategy::ValueDip];

    /// Minimum score required to qualify.
    pub fn score_floor(&self, strict: bool) -> u32 {
        match (self, strict) {
            (Strategy::Breakout | Strategy::Trend, true) => 75,
            (Strategy::Breakout | Strategy::Trend, false) => 60,
            (Strategy::ValueDip, true) => 65,
            (Strategy::ValueDip, false) => 50,
        }
    }

    /// Apply this strategy's rules to one bar.
    pub fn evaluate(
        &self,
        features: &FeatureBundle,
        latest: &IndicatorSnapshot,
        previous: &IndicatorSnapshot,
        strict: bool,
    ) -> Evaluation {
        let mut eval = Evaluation::default();
        let floor = self.score_floor(strict);

        match self {
            Strategy::Breakout => {
                let above_band = features.close > latest.bb_upper;

                if features.volume_ratio > BREAKOUT_SURGE_RATIO {
                    eval.add(25, Some(Signal::VolumeSurge));
                }
                if above_band {
                    eval.add(25, Some(Signal::BandBreakout));
                }
                if features.band_width < COMPRESSION_WIDTH {
                    eval.add(10, Some(Signal::Compression));
                }
                if latest.macd_hist > Decimal::ZERO && latest.macd_hist > previous.macd_hist {
                    eval.add(20, Some(Signal::MacdTurnsPositive));
                }

                let min_ratio = if strict { dec!(2.0) } else { dec!(1.5) };
                eval.qualifies =
                    (above_band || features.volume_ratio > min_ratio) && eval.score >= floor;
            }
            Strategy::Trend => {
                if latest.ma5 > latest.ma20 && latest.ma20 > latest.ma60 {
                    eval.add(30, Some(Signal::MaAlignment));
                }
                if latest.obv > latest.obv_ma10 {
                    eval.add(20, Some(Signal::Accumulation));
                }
                if latest.macd > latest.macd_signal {
                    eval.add(20, Some(Signal::MacdGoldenCross));
                }
                if features.close > latest.ma20 {
                    eval.add(10, None);
                }

                eval.qualifies = latest.ma5 > latest.ma20 && eval.score >= floor;
            }
            Strategy::ValueDip => {
                let distance = relative_distance(features.close, latest.ma20);
                if distance < RETEST_DISTANCE {
                    eval.add(30, Some(Signal::RetestMa20));
                }
                if latest.rsi14 >= dec!(40) && latest.rsi14 <= dec!(60) {
                    eval.add(20, None);
                }
                if features.bias_pct < dec!(-5) {
                    eval.add(20, Some(Signal::OversoldBias));
                }

                eval.qualifies = features.close > latest.ma60
                    && latest.rsi14 < dec!(70)
                    && eval.score >= floor;
            }
        }

        eval
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Breakout => write!(f, "breakout"),
            Strategy::Trend => write!(f, "trend"),
            Strategy::ValueDip => write!(f, "value_dip"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "breakout" | "momentum" => Ok(Strategy::Breakout),
            "trend" | "trend_following" => Ok(Strategy::Trend),
            "value_dip" | "value" | "dip" => Ok(Strategy::ValueDip),
            other => Err(format!(
                "unknown strategy '{other}' (expected breakout, trend or value_dip)"
            )),
        }
    }
}

/// Qualitative tag emitted by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    VolumeSurge,
    BandBreakout,
    Compression,
    MacdTurnsPositive,
    MaAlignment,
    Accumulation,
    MacdGoldenCross,
    RetestMa20,
    OversoldBias,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::VolumeSurge => "volume surge",
            Signal::BandBreakout => "band breakout",
            Signal::Compression => "compression",
            Signal::MacdTurnsPositive => "MACD turns positive",
            Signal::MaAlignment => "MA alignment",
            Signal::Accumulation => "accumulation",
            Signal::MacdGoldenCross => "MACD golden cross",
            Signal::RetestMa20 => "retest of MA20",
            Signal::OversoldBias => "oversold negative bias",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one rule pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub score: u32,
    /// Tags in rule order; rules without a tag add points only.
    pub signals: Vec<Signal>,
    pub qualifies: bool,
}

impl Evaluation {
    fn add(&mut self, points: u32, signal: Option<Signal>) {
        self.score += points;
        self.signals.extend(signal);
    }
}
