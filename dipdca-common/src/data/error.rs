// =================================================================
// data/error.rs - Error Types
// =================================================================

use thiserror::Error;

/// Error types for loading and shaping price data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Years must be between 1 and {max}, got {got}")]
    InvalidYears { got: u32, max: u32 },

    #[error("No price data for {0}")]
    EmptyHistory(String),

    #[error("No FX rates available for {0}")]
    MissingFxRates(String),
}
