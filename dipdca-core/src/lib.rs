pub mod backtest;
pub mod config;
pub mod report;
