//! Simple and exponential moving averages.

use rust_decimal::Decimal;

/// Decimal places kept on the recursive EMA state; a constant input must
/// produce a constant EMA.
const EMA_DP: u32 = 12;

/// Simple moving average, aligned with the input.
///
/// Index `i` holds the mean of `values[i + 1 - window..=i]`; the first
/// `window - 1` entries are `None`.
pub fn sma(values: &[Decimal], window: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let divisor = Decimal::from(window);
    let mut sum: Decimal = values[..window].iter().copied().sum();
    out[window - 1] = Some(sum / divisor);

    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / divisor);
    }

    out
}

/// Exponential moving average with `k = 2 / (period + 1)`, aligned with the input.
///
/// Seeded with the SMA of the first `period` values, so the first defined
/// entry is at index `period - 1`.
pub fn ema(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let k = Decimal::TWO / Decimal::from(period + 1);
    let one_minus_k = Decimal::ONE - k;

    let mut prev = (values[..period].iter().copied().sum::<Decimal>() / Decimal::from(period))
        .round_dp(EMA_DP);
    out[period - 1] = Some(prev);

    for i in period..values.len() {
        prev = (values[i] * k + prev * one_minus_k).round_dp(EMA_DP);
        out[i] = Some(prev);
    }

    out
}

/// EMA over a series whose head is undefined.
///
/// The EMA starts at the first defined value; gaps after that point are
/// not expected and end the computation.
pub fn ema_of_defined(values: &[Option<Decimal>], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };

    let defined: Vec<Decimal> = values[start..].iter().map_while(|v| *v).collect();
    for (offset, value) in ema(&defined, period).into_iter().enumerate() {
        out[start + offset] = value;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sma_alignment() {
        let values = [dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)];
        let out = sma(&values, 3);
        assert_eq!(out, vec![None, None, Some(dec!(2)), Some(dec!(3)), Some(dec!(4))]);
    }

    #[test]
    fn test_sma_short_input() {
        assert_eq!(sma(&[dec!(1), dec!(2)], 3), vec![None, None]);
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let values = [dec!(2), dec!(4), dec!(6), dec!(8)];
        let out = ema(&values, 3);
        // seed = 4, k = 0.5 -> 8 * 0.5 + 4 * 0.5 = 6
        assert_eq!(out, vec![None, None, Some(dec!(4)), Some(dec!(6))]);
    }

    #[test]
    fn test_ema_of_defined_offsets_output() {
        let values = [None, None, Some(dec!(2)), Some(dec!(4)), Some(dec!(6))];
        let out = ema_of_defined(&values, 2);
        assert_eq!(out[..3], [None, None, None]);
        assert_eq!(out[3], Some(dec!(3)));
        assert!(out[4].is_some());
    }
}
