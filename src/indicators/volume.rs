//! Volume-based indicators: On-Balance-Volume and Money Flow Index.

use crate::data::PriceBar;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;

/// On-Balance-Volume, starting at zero on the first bar.
///
/// Adds the bar's volume on an up close, subtracts it on a down close and
/// carries the previous value on an unchanged close.
pub fn obv(bars: &[PriceBar]) -> Vec<Decimal> {
    let mut out = Vec::with_capacity(bars.len());
    let mut running = Decimal::ZERO;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            match bar.close.cmp(&bars[i - 1].close) {
                Ordering::Greater => running += bar.volume,
                Ordering::Less => running -= bar.volume,
                Ordering::Equal => {}
            }
        }
        out.push(running);
    }

    out
}

/// Money Flow Index over `period` typical-price comparisons.
///
/// Raw money flow is `typical_price * volume`. A bar contributes positive
/// flow when its typical price is above the prior bar's, negative when
/// below, nothing when unchanged. With no negative flow in the window the
/// index is 100, matching the RSI convention.
pub fn mfi(bars: &[PriceBar], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; bars.len()];
    if period == 0 || bars.len() <= period {
        return out;
    }

    // flows[i] is the signed flow of bar i relative to bar i - 1 (flows[0] unused)
    let mut positive = vec![Decimal::ZERO; bars.len()];
    let mut negative = vec![Decimal::ZERO; bars.len()];
    for i in 1..bars.len() {
        let tp = bars[i].typical_price();
        let raw = tp * bars[i].volume;
        match tp.cmp(&bars[i - 1].typical_price()) {
            Ordering::Greater => positive[i] = raw,
            Ordering::Less => negative[i] = raw,
            Ordering::Equal => {}
        }
    }

    for i in period..bars.len() {
        let window = i + 1 - period..=i;
        let pos: Decimal = positive[window.clone()].iter().copied().sum();
        let neg: Decimal = negative[window].iter().copied().sum();

        out[i] = Some(if neg.is_zero() {
            dec!(100)
        } else {
            dec!(100) - dec!(100) / (Decimal::ONE + pos / neg)
        });
    }

    out
}
