//! Bollinger Bands.

use rust_decimal::{Decimal, MathematicalOps};

/// Upper/lower band and normalized width, each aligned with the input.
#[derive(Debug, Clone, Default)]
pub struct BollingerSeries {
    pub upper: Vec<Option<Decimal>>,
    pub lower: Vec<Option<Decimal>>,
    pub width: Vec<Option<Decimal>>,
}

/// Bollinger Bands around the `window`-bar SMA using the population
/// standard deviation of the same window.
///
/// Width is `(upper - lower) / middle`, defined as 0 when the middle band is
/// 0. A constant series collapses both bands onto the average, so its
/// width is 0.
pub fn bollinger(closes: &[Decimal], window: usize, num_std: Decimal) -> BollingerSeries {
    let n = closes.len();
    let mut series = BollingerSeries {
        upper: vec![None; n],
        lower: vec![None; n],
        width: vec![None; n],
    };
    if window == 0 || n < window {
        return series;
    }

    let divisor = Decimal::from(window);
    for i in window - 1..n {
        let slice = &closes[i + 1 - window..=i];
        let middle = slice.iter().copied().sum::<Decimal>() / divisor;
        let variance = slice
            .iter()
            .map(|&c| {
                let diff = c - middle;
                diff * diff
            })
            .sum::<Decimal>()
            / divisor;
        let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);

        let upper = middle + num_std * std_dev;
        let lower = middle - num_std * std_dev;
        let width = if middle.is_zero() {
            Decimal::ZERO
        } else {
            (upper - lower) / middle
        };

        series.upper[i] = Some(upper);
        series.lower[i] = Some(lower);
        series.width[i] = Some(width);
    }

    series
}
