//! Fundamentals-based price bands and balance-sheet risk flags.
//!
//! Two models, tried in order:
//! - consensus: the analyst mean target is the fair price
//! - earnings: forward EPS times a sector multiple
//!
//! Funds are not valued.

use crate::utils::decimal::round_price;
use crate::utils::symbols::is_fund;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const CONSENSUS_CHEAP: Decimal = dec!(0.8);
const CONSENSUS_EXPENSIVE: Decimal = dec!(1.2);
const GROWTH_MULTIPLE: Decimal = dec!(20);
const DEFAULT_MULTIPLE: Decimal = dec!(15);
const MIN_GROSS_MARGIN: Decimal = dec!(0.1);
const MAX_DEBT_TO_EQUITY: Decimal = dec!(150);

/// Caller-supplied fundamentals. Missing values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub current_price: Decimal,
    pub forward_pe: Option<Decimal>,
    pub forward_eps: Option<Decimal>,
    pub target_mean_price: Option<Decimal>,
    pub operating_cash_flow: Option<Decimal>,
    /// Fraction, e.g. `0.45` for 45%.
    pub gross_margin: Option<Decimal>,
    /// Percent, e.g. `80` for 0.8x.
    pub debt_to_equity: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationModel {
    Consensus,
    Earnings,
    /// Neither a target nor a positive forward EPS was available.
    None,
}

impl fmt::Display for ValuationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuationModel::Consensus => write!(f, "analyst consensus"),
            ValuationModel::Earnings => write!(f, "forward earnings multiple"),
            ValuationModel::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    NegativeOperatingCashFlow,
    LowGrossMargin,
    HighLeverage,
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFlag::NegativeOperatingCashFlow => write!(f, "negative operating cash flow"),
            RiskFlag::LowGrossMargin => write!(f, "gross margin below 10%"),
            RiskFlag::HighLeverage => write!(f, "debt to equity above 150%"),
        }
    }
}

/// Where the current price sits against the computed bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceZone {
    /// At or below the cheap price.
    Cheap,
    /// Between cheap and expensive.
    Fair,
    /// At or above the expensive price.
    Expensive,
}

impl fmt::Display for PriceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceZone::Cheap => write!(f, "cheap"),
            PriceZone::Fair => write!(f, "fair"),
            PriceZone::Expensive => write!(f, "expensive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub symbol: String,
    pub model: ValuationModel,
    pub cheap_price: Decimal,
    pub fair_price: Decimal,
    pub expensive_price: Decimal,
    /// `None` when no model applied.
    pub zone: Option<PriceZone>,
    pub risks: Vec<RiskFlag>,
}

/// Earnings multiple for a ticker. Codes containing 2, 3 or 6 are treated
/// as growth sectors.
fn earnings_multiple(symbol: &str) -> Decimal {
    if symbol.contains(['2', '3', '6']) {
        GROWTH_MULTIPLE
    } else {
        DEFAULT_MULTIPLE
    }
}

fn risk_flags(f: &Fundamentals) -> Vec<RiskFlag> {
    let mut risks = Vec::new();
    if f.operating_cash_flow.is_some_and(|ocf| ocf < Decimal::ZERO) {
        risks.push(RiskFlag::NegativeOperatingCashFlow);
    }
    if f.gross_margin.is_some_and(|gm| gm < MIN_GROSS_MARGIN) {
        risks.push(RiskFlag::LowGrossMargin);
    }
    if f.debt_to_equity.is_some_and(|de| de > MAX_DEBT_TO_EQUITY) {
        risks.push(RiskFlag::HighLeverage);
    }
    risks
}

/// Value a listing. Returns `None` for funds.
pub fn valuate(symbol: &str, fundamentals: &Fundamentals) -> Option<Valuation> {
    if is_fund(symbol) {
        debug!(symbol, "Skipping valuation for fund");
        return None;
    }

    let target = fundamentals.target_mean_price.filter(|t| *t > Decimal::ZERO);
    let eps = fundamentals.forward_eps.filter(|e| *e > Decimal::ZERO);

    let (model, cheap, fair, expensive) = match (target, eps) {
        (Some(target), _) => (
            ValuationModel::Consensus,
            target * CONSENSUS_CHEAP,
            target,
            target * CONSENSUS_EXPENSIVE,
        ),
        (None, Some(eps)) => {
            let m = earnings_multiple(symbol);
            (
                ValuationModel::Earnings,
                eps * m * dec!(0.75),
                eps * m,
                eps * m * dec!(1.25),
            )
        }
        (None, None) => (
            ValuationModel::None,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        ),
    };

    let price = fundamentals.current_price;
    let zone = (model != ValuationModel::None).then(|| {
        if price <= cheap {
            PriceZone::Cheap
        } else if price >= expensive {
            PriceZone::Expensive
        } else {
            PriceZone::Fair
        }
    });

    Some(Valuation {
        symbol: symbol.to_string(),
        model,
        cheap_price: round_price(cheap),
        fair_price: round_price(fair),
        expensive_price: round_price(expensive),
        zone,
        risks: risk_flags(fundamentals),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(price: Decimal) -> Fundamentals {
        Fundamentals {
            current_price: price,
            ..Default::default()
        }
    }

    #[test]
    fn test_consensus_model_wins_over_eps() {
        let f = Fundamentals {
            target_mean_price: Some(dec!(1000)),
            forward_eps: Some(dec!(40)),
            ..base(dec!(900))
        };
        let v = valuate("2330.TW", &f).unwrap();

        assert_eq!(v.model, ValuationModel::Consensus);
        assert_eq!(v.cheap_price, dec!(800));
        assert_eq!(v.fair_price, dec!(1000));
        assert_eq!(v.expensive_price, dec!(1200));
        assert_eq!(v.zone, Some(PriceZone::Fair));
    }

    #[test]
    fn test_earnings_model_growth_multiple() {
        let f = Fundamentals {
            forward_eps: Some(dec!(10)),
            ..base(dec!(140))
        };
        let v = valuate("2454.TW", &f).unwrap();

        assert_eq!(v.model, ValuationModel::Earnings);
        assert_eq!(v.cheap_price, dec!(150));
        assert_eq!(v.fair_price, dec!(200));
        assert_eq!(v.expensive_price, dec!(250));
        assert_eq!(v.zone, Some(PriceZone::Cheap));
    }

    #[test]
    fn test_earnings_model_default_multiple() {
        let f = Fundamentals {
            forward_eps: Some(dec!(10)),
            target_mean_price: Some(Decimal::ZERO),
            ..base(dec!(200))
        };
        let v = valuate("1101.TW", &f).unwrap();

        assert_eq!(v.fair_price, dec!(150));
        assert_eq!(v.expensive_price, dec!(187.5));
        assert_eq!(v.zone, Some(PriceZone::Expensive));
    }

    #[test]
    fn test_no_model_without_target_or_positive_eps() {
        let f = Fundamentals {
            forward_eps: Some(dec!(-2)),
            ..base(dec!(50))
        };
        let v = valuate("1101.TW", &f).unwrap();

        assert_eq!(v.model, ValuationModel::None);
        assert_eq!(v.fair_price, Decimal::ZERO);
        assert!(v.zone.is_none());
    }

    #[test]
    fn test_risk_flags() {
        let f = Fundamentals {
            operating_cash_flow: Some(dec!(-1_000_000)),
            gross_margin: Some(dec!(0.05)),
            debt_to_equity: Some(dec!(180)),
            ..base(dec!(10))
        };
        let v = valuate("1101.TW", &f).unwrap();
        assert_eq!(
            v.risks,
            vec![
                RiskFlag::NegativeOperatingCashFlow,
                RiskFlag::LowGrossMargin,
                RiskFlag::HighLeverage
            ]
        );

        let healthy = Fundamentals {
            operating_cash_flow: Some(dec!(5)),
            gross_margin: Some(dec!(0.4)),
            debt_to_equity: Some(dec!(150)),
            ..base(dec!(10))
        };
        assert!(valuate("1101.TW", &healthy).unwrap().risks.is_empty());
    }

    #[test]
    fn test_funds_are_not_valued() {
        let f = Fundamentals {
            target_mean_price: Some(dec!(50)),
            ..base(dec!(45))
        };
        assert!(valuate("0050.TW", &f).is_none());
    }
}
