//! Momentum oscillators: RSI and MACD.

use super::moving_average::{ema, ema_of_defined};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Relative Strength Index with Wilder smoothing.
///
/// The first averages are the simple means of the first `period` changes,
/// so index `period` is the first defined value. When the average loss is
/// zero the RSI is 100, including on a perfectly flat series.
pub fn rsi(closes: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let period_d = Decimal::from(period);
    let period_minus_1 = Decimal::from(period - 1);

    let changes: Vec<Decimal> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: Decimal| c.max(Decimal::ZERO);
    let loss = |c: Decimal| (-c).max(Decimal::ZERO);

    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<Decimal>() / period_d;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<Decimal>() / period_d;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for (i, &c) in changes.iter().enumerate().skip(period) {
        avg_gain = (avg_gain * period_minus_1 + gain(c)) / period_d;
        avg_loss = (avg_loss * period_minus_1 + loss(c)) / period_d;
        // changes[i] is the move into bar i + 1
        out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        return dec!(100);
    }
    let rs = avg_gain / avg_loss;
    dec!(100) - dec!(100) / (Decimal::ONE + rs)
}

/// MACD line, signal line and histogram, each aligned with the input.
#[derive(Debug, Clone, Default)]
pub struct MacdSeries {
    pub line: Vec<Option<Decimal>>,
    pub signal: Vec<Option<Decimal>>,
    pub histogram: Vec<Option<Decimal>>,
}

/// Moving Average Convergence Divergence.
///
/// Line = EMA(fast) - EMA(slow), signal = EMA(signal) of the line,
/// histogram = line - signal. With (12, 26, 9) the line is defined from
/// index 25 and the signal/histogram from index 33.
pub fn macd(closes: &[Decimal], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<Option<Decimal>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal_line = ema_of_defined(&line, signal);

    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    MacdSeries {
        line,
        signal: signal_line,
        histogram,
    }
}
