// dipdca-core/src/backtest/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Contribution multiplier chosen for one period
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Multiplier {
    Base = 1,
    Double = 2,
    Triple = 3,
}

impl Multiplier {
    /// Pick the tier for a drawdown fraction. Thresholds are inclusive and the
    /// higher tier is checked first.
    pub fn for_drawdown(drawdown: f64, tier2: f64, tier3: f64) -> Self {
        if drawdown >= tier3 {
            Multiplier::Triple
        } else if drawdown >= tier2 {
            Multiplier::Double
        } else {
            Multiplier::Base
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn factor(self) -> f64 {
        f64::from(self.value())
    }
}

impl From<Multiplier> for u8 {
    fn from(multiplier: Multiplier) -> Self {
        multiplier.value()
    }
}

impl TryFrom<u8> for Multiplier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Multiplier::Base),
            2 => Ok(Multiplier::Double),
            3 => Ok(Multiplier::Triple),
            other => Err(format!("multiplier must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.value())
    }
}

/// Strategy parameters as the caller supplies them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Contribution per period, in the price currency
    pub base_amount: f64,
    /// Rolling high window, in price points
    pub lookback_days: i64,
    /// Drawdown percent that doubles the contribution
    pub tier2_pct: f64,
    /// Drawdown percent that triples the contribution
    pub tier3_pct: f64,
}

impl BacktestConfig {
    pub fn new(base_amount: f64) -> Self {
        Self {
            base_amount,
            lookback_days: 30,
            tier2_pct: 10.0,
            tier3_pct: 20.0,
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: i64) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    pub fn with_thresholds(mut self, tier2_pct: f64, tier3_pct: f64) -> Self {
        self.tier2_pct = tier2_pct;
        self.tier3_pct = tier3_pct;
        self
    }
}

/// Multiplier applied on a given date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierPoint {
    pub date: String,
    pub multiplier: Multiplier,
}

/// Summary statistics for one portfolio
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub total_invested: f64,
    pub final_value: f64,
    pub profit: f64,
    /// Profit over invested, in percent
    pub profit_pct: f64,
    pub return_multiple: f64,
    /// CAGR in percent
    pub annualized_return_pct: f64,
    pub duration_years: f64,
    /// Largest peak-to-trough fall, in currency
    pub max_drawdown: f64,
    /// Largest fall relative to the final peak, in percent, never positive
    pub max_drawdown_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub baseline: PerformanceMetrics,
    pub strategy: PerformanceMetrics,
}

/// Everything a renderer needs from one backtest run.
///
/// All series are index aligned with `dates`, which only holds the price
/// points that took part in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub dates: Vec<String>,
    pub baseline_values: Vec<f64>,
    pub strategy_values: Vec<f64>,
    pub multipliers: Vec<MultiplierPoint>,
    pub price_series: Vec<f64>,
    pub metrics: PortfolioMetrics,
}

impl BacktestResult {
    /// Multiplier for the most recent retained point
    pub fn latest_multiplier(&self) -> Multiplier {
        self.multipliers
            .last()
            .map(|point| point.multiplier)
            .unwrap_or(Multiplier::Base)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert_eq!(Multiplier::for_drawdown(0.0, 0.1, 0.2), Multiplier::Base);
        assert_eq!(Multiplier::for_drawdown(0.1, 0.1, 0.2), Multiplier::Double);
        assert_eq!(Multiplier::for_drawdown(0.2, 0.1, 0.2), Multiplier::Triple);
        assert_eq!(Multiplier::for_drawdown(f64::NAN, 0.1, 0.2), Multiplier::Base);
        // Equal thresholds skip the middle tier
        assert_eq!(Multiplier::for_drawdown(0.15, 0.15, 0.15), Multiplier::Triple);
    }

    #[test]
    fn test_multiplier_serializes_as_integer() {
        let point = MultiplierPoint {
            date: "2024-01-02".to_string(),
            multiplier: Multiplier::Double,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"date":"2024-01-02","multiplier":2}"#);

        let back: MultiplierPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
        assert!(serde_json::from_str::<Multiplier>("4").is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = BacktestConfig::new(50.0)
            .with_lookback_days(90)
            .with_thresholds(5.0, 15.0);
        assert_eq!(config.base_amount, 50.0);
        assert_eq!(config.lookback_days, 90);
        assert_eq!(config.tier2_pct, 5.0);
        assert_eq!(config.tier3_pct, 15.0);
    }

    #[test]
    fn test_metrics_use_camel_case() {
        let value = serde_json::to_value(PerformanceMetrics::default()).unwrap();
        assert!(value.get("annualizedReturnPct").is_some());
        assert!(value.get("maxDrawdownPct").is_some());
    }
}
