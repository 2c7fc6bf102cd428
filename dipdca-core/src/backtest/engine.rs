// dipdca-core/src/backtest/engine.rs

use super::errors::BacktestError;
use super::metrics::MetricsCalculator;
use super::portfolio::simulate;
use super::signal::SignalParams;
use super::types::{BacktestConfig, BacktestResult, PortfolioMetrics};
use dipdca_common::data::PricePoint;
use tracing::{info, warn};

pub struct BacktestEngine {
    config: BacktestConfig,
    params: SignalParams,
    metrics_calculator: MetricsCalculator,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        let params = SignalParams::from_percent(config.lookback_days, config.tier2_pct, config.tier3_pct);

        if config.lookback_days < 1 {
            warn!("Lookback {} clamped to {}", config.lookback_days, params.lookback);
        }
        if config.tier2_pct < 0.0 || config.tier3_pct < config.tier2_pct {
            warn!(
                "Thresholds {}%/{}% clamped to {}%/{}%",
                config.tier2_pct,
                config.tier3_pct,
                params.tier2 * 100.0,
                params.tier3 * 100.0
            );
        }

        Self {
            config,
            params,
            metrics_calculator: MetricsCalculator::new(),
        }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    /// Run baseline and strategy over `prices` and collect both metric sets
    pub fn run(&self, prices: &[PricePoint]) -> Result<BacktestResult, BacktestError> {
        info!(
            "Starting backtest over {} prices: base={}, lookback={}, tiers={}/{}",
            prices.len(),
            self.config.base_amount,
            self.params.lookback,
            self.params.tier2,
            self.params.tier3
        );

        let sim = simulate(prices, self.config.base_amount, &self.params)?;

        let baseline = self.metrics_calculator.calculate(
            &sim.dates,
            &sim.baseline_values,
            sim.baseline.cumulative_invested,
        );
        let strategy = self.metrics_calculator.calculate(
            &sim.dates,
            &sim.strategy_values,
            sim.strategy.cumulative_invested,
        );

        info!(
            "Backtest completed over {} of {} prices. Baseline {:.2}%, strategy {:.2}%",
            sim.len(),
            prices.len(),
            baseline.profit_pct,
            strategy.profit_pct
        );

        Ok(BacktestResult {
            dates: sim.dates,
            baseline_values: sim.baseline_values,
            strategy_values: sim.strategy_values,
            multipliers: sim.multipliers,
            price_series: sim.prices,
            metrics: PortfolioMetrics { baseline, strategy },
        })
    }
}

/// One-shot backtest with thresholds given in percent
pub fn run_backtest(
    prices: &[PricePoint],
    base_amount: f64,
    lookback_days: i64,
    tier2_pct: f64,
    tier3_pct: f64,
) -> Result<BacktestResult, BacktestError> {
    let config = BacktestConfig::new(base_amount)
        .with_lookback_days(lookback_days)
        .with_thresholds(tier2_pct, tier3_pct);
    BacktestEngine::new(config).run(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::types::Multiplier;

    fn prices(values: &[f64]) -> Vec<PricePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, price)| PricePoint::new(format!("2024-01-{:02}", i + 1), *price))
            .collect()
    }

    #[test]
    fn test_engine_normalizes_params() {
        let engine = BacktestEngine::new(BacktestConfig::new(10.0).with_lookback_days(0).with_thresholds(30.0, 5.0));
        assert_eq!(engine.params().lookback, 1);
        assert_eq!(engine.params().tier2, 0.3);
        assert_eq!(engine.params().tier3, 0.3);
    }

    #[test]
    fn test_result_series_are_aligned() {
        let result = run_backtest(&prices(&[100.0, -1.0, 90.0, 80.0]), 10.0, 5, 10.0, 20.0).unwrap();

        assert_eq!(result.dates.len(), 3);
        assert_eq!(result.baseline_values.len(), 3);
        assert_eq!(result.strategy_values.len(), 3);
        assert_eq!(result.price_series, vec![100.0, 90.0, 80.0]);

        let dates: Vec<_> = result.multipliers.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-03", "2024-01-04"]);
        assert_eq!(result.latest_multiplier(), Multiplier::Triple);
    }

    #[test]
    fn test_metrics_follow_invested_totals() {
        let result = run_backtest(&prices(&[100.0, 70.0]), 10.0, 2, 10.0, 25.0).unwrap();

        assert_eq!(result.metrics.baseline.total_invested, 20.0);
        assert_eq!(result.metrics.strategy.total_invested, 40.0);
        assert_eq!(result.metrics.baseline.final_value, *result.baseline_values.last().unwrap());
        assert_eq!(result.metrics.strategy.final_value, *result.strategy_values.last().unwrap());
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            run_backtest(&[], 10.0, 5, 10.0, 20.0),
            Err(BacktestError::InsufficientData)
        );
    }
}
