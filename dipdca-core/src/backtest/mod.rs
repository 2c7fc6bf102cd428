pub mod engine;
pub mod errors;
pub mod metrics;
pub mod portfolio;
pub mod signal;
pub mod types;

pub use engine::{run_backtest, BacktestEngine};
pub use errors::BacktestError;
pub use metrics::MetricsCalculator;
pub use portfolio::{simulate, PortfolioState, Simulation};
pub use signal::{compute_multiplier, recent_high, RecentHigh, SignalParams};
pub use types::*;
