//! One-paragraph narrative for a score result.

use super::scoring::{BandStatus, ScoreResult};
use crate::utils::decimal::round_price;

/// Build a short human-readable read of a result.
pub fn summarize(result: &ScoreResult) -> String {
    let mut parts = Vec::with_capacity(3);

    parts.push(match result.score {
        s if s >= 75 => format!(
            "{} shows strong bullish structure (score {}); momentum and volume support further upside.",
            result.symbol, s
        ),
        s if s >= 50 => format!(
            "{} is range-bound (score {}); wait for confirmation near support {}.",
            result.symbol,
            s,
            round_price(result.support_price)
        ),
        s => format!(
            "{} looks weak (score {}); no setup worth acting on.",
            result.symbol, s
        ),
    });

    match result.band_status {
        BandStatus::Compressed => {
            parts.push("Bollinger bands are compressed; a directional move may follow.".to_string())
        }
        BandStatus::Breakout => {
            parts.push("Price closed above the upper band.".to_string())
        }
        BandStatus::Neutral => {}
    }

    if !result.qualifies {
        if let Some(note) = &result.status_note {
            parts.push(format!("Note: {note}."));
        }
    }

    parts.join(" ")
}
