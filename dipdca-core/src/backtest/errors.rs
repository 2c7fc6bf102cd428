use thiserror::Error;

/// Backtest error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BacktestError {
    /// The price series had no points at all
    #[error("Insufficient price data for backtest")]
    InsufficientData,
}
