// data/mod.rs
pub mod types;
pub mod error;
pub mod fx;
pub mod source;

// Re-export main interfaces for easy access
pub use types::*;
pub use error::DataError;
pub use fx::{convert_currency, trim_to_years};
pub use source::{JsonFileSource, PriceSource};
