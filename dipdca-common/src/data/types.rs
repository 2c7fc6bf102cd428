// =================================================================
// data/types.rs - Data Structures
// =================================================================

use super::DataError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest history a query may ask for
pub const MAX_YEARS: u32 = 10;

/// A single closing price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Calendar date, `YYYY-MM-DD` or RFC 3339
    pub date: String,
    /// Closing price in the history's currency
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        Self {
            date: date.into(),
            price,
        }
    }

    /// Whether the price can take part in a backtest
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }
}

/// Parse a price date. Plain dates are taken as UTC midnight.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Assets with a known listing symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Reit,
    Gold,
    Btc,
}

impl Asset {
    pub const ALL: [Asset; 3] = [Asset::Reit, Asset::Gold, Asset::Btc];

    pub fn key(&self) -> &'static str {
        match self {
            Asset::Reit => "reit",
            Asset::Gold => "gold",
            Asset::Btc => "btc",
        }
    }

    /// Ticker the prices are quoted under
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Reit => "REET",
            Asset::Gold => "GLD",
            Asset::Btc => "BTC-USD",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Asset {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reit" => Ok(Asset::Reit),
            "gold" => Ok(Asset::Gold),
            "btc" => Ok(Asset::Btc),
            _ => Err(DataError::UnsupportedAsset(s.to_string())),
        }
    }
}

/// Currencies a price history can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Jpy,
}

impl Currency {
    pub fn key(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Jpy => "jpy",
        }
    }

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
        }
    }

    pub fn sign(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Jpy => "¥",
        }
    }

    /// Digits shown after the decimal point
    pub fn fraction_digits(&self) -> u32 {
        match self {
            Currency::Usd => 2,
            Currency::Jpy => 0,
        }
    }

    /// USD cross rate symbol, `None` for the listing currency itself
    pub fn fx_symbol(&self) -> Option<&'static str> {
        match self {
            Currency::Usd => None,
            Currency::Jpy => Some("JPY=X"),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Currency {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "jpy" => Ok(Currency::Jpy),
            _ => Err(DataError::UnsupportedCurrency(s.to_string())),
        }
    }
}

/// Parameters for loading a price history
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    pub asset: Asset,
    pub years: u32,
    pub currency: Currency,
}

impl HistoryQuery {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            years: 1,
            currency: Currency::Usd,
        }
    }

    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.years == 0 || self.years > MAX_YEARS {
            return Err(DataError::InvalidYears {
                got: self.years,
                max: MAX_YEARS,
            });
        }
        Ok(())
    }
}

/// Daily closing prices for one asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistory {
    pub asset: Asset,
    pub symbol: String,
    pub years: u32,
    pub currency: Currency,
    pub prices: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn new(asset: Asset, currency: Currency, prices: Vec<PricePoint>) -> Self {
        Self {
            asset,
            symbol: asset.symbol().to_string(),
            years: 1,
            currency,
            prices,
        }
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.prices.last()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
