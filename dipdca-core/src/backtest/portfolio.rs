// dipdca-core/src/backtest/portfolio.rs

use super::errors::BacktestError;
use super::signal::SignalParams;
use super::types::{Multiplier, MultiplierPoint};
use dipdca_common::data::PricePoint;
use tracing::debug;

/// Units bought and money put in so far
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortfolioState {
    pub units_held: f64,
    pub cumulative_invested: f64,
}

impl PortfolioState {
    /// Buy `amount` worth of units at `price`
    pub fn contribute(&mut self, amount: f64, price: f64) {
        self.units_held += amount / price;
        self.cumulative_invested += amount;
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.units_held * price
    }
}

/// Aligned series produced by walking a price history once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Simulation {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
    pub multipliers: Vec<MultiplierPoint>,
    pub baseline_values: Vec<f64>,
    pub strategy_values: Vec<f64>,
    pub baseline: PortfolioState,
    pub strategy: PortfolioState,
}

impl Simulation {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            dates: Vec::with_capacity(capacity),
            prices: Vec::with_capacity(capacity),
            multipliers: Vec::with_capacity(capacity),
            baseline_values: Vec::with_capacity(capacity),
            strategy_values: Vec::with_capacity(capacity),
            baseline: PortfolioState::default(),
            strategy: PortfolioState::default(),
        }
    }

    fn record(&mut self, point: &PricePoint, multiplier: Multiplier) {
        let price = point.price;
        self.dates.push(point.date.clone());
        self.prices.push(price);
        self.baseline_values.push(self.baseline.market_value(price));
        self.strategy_values.push(self.strategy.market_value(price));
        self.multipliers.push(MultiplierPoint {
            date: point.date.clone(),
            multiplier,
        });
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Accumulate the baseline (always 1x) and strategy portfolios over `prices`.
///
/// Points with a non-finite or non-positive price are left out of every
/// output series. Multipliers are computed against the raw position of each
/// point, so the output index and the input index can differ.
pub fn simulate(
    prices: &[PricePoint],
    base_amount: f64,
    params: &SignalParams,
) -> Result<Simulation, BacktestError> {
    if prices.is_empty() {
        return Err(BacktestError::InsufficientData);
    }

    let mut sim = Simulation::with_capacity(prices.len());

    for (index, point) in prices.iter().enumerate() {
        if !point.is_valid() {
            debug!("Skipping {} with unusable price {}", point.date, point.price);
            continue;
        }

        let multiplier = params.multiplier_at(prices, index);

        sim.baseline.contribute(base_amount, point.price);
        sim.strategy
            .contribute(base_amount * multiplier.factor(), point.price);

        sim.record(point, multiplier);
    }

    Ok(sim)
}
