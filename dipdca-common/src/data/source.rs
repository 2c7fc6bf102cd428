// data/source.rs

use super::fx::{convert_currency, trim_to_years};
use super::types::{parse_date, Currency, HistoryQuery, PriceHistory, PricePoint};
use super::DataError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Interface every price history provider must follow
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Load the daily closes requested by `query`, ascending by date
    async fn load(&self, query: &HistoryQuery) -> Result<PriceHistory, DataError>;
}

/// Either a full history document or a bare list of points
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceFile {
    Document(PriceHistory),
    Points(Vec<PricePoint>),
}

/// Reads price histories saved as JSON under a data directory.
///
/// Asset closes live in `<dir>/<asset>.json` and USD cross rates in
/// `<dir>/fx_<currency>.json`. Bare point lists are taken to be quoted in USD.
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn asset_path(&self, query: &HistoryQuery) -> PathBuf {
        self.dir.join(format!("{}.json", query.asset.key()))
    }

    pub fn fx_path(&self, currency: Currency) -> PathBuf {
        self.dir.join(format!("fx_{}.json", currency.key()))
    }

    /// Read a single history file, shaped to `query`
    pub async fn load_file(&self, path: &Path, query: &HistoryQuery) -> Result<PriceHistory, DataError> {
        query.validate()?;

        let mut history = match read_price_file(path).await? {
            PriceFile::Document(history) => history,
            PriceFile::Points(points) => PriceHistory::new(query.asset, Currency::Usd, points),
        };
        debug!("Read {} price points from {}", history.prices.len(), path.display());

        history.prices.sort_by_key(|point| parse_date(&point.date));
        history.prices = trim_to_years(history.prices, query.years);
        history.years = query.years;

        if history.is_empty() {
            return Err(DataError::EmptyHistory(history.symbol));
        }

        if history.currency != query.currency {
            history = self.convert(history, query.currency).await?;
        }

        info!(
            "Loaded {} prices for {} ({}) in {}",
            history.prices.len(),
            history.asset,
            history.symbol,
            history.currency
        );
        Ok(history)
    }

    async fn convert(&self, mut history: PriceHistory, target: Currency) -> Result<PriceHistory, DataError> {
        if history.currency != Currency::Usd || target.fx_symbol().is_none() {
            return Err(DataError::UnsupportedCurrency(format!(
                "{} -> {}",
                history.currency, target
            )));
        }

        let rates = match read_price_file(&self.fx_path(target)).await? {
            PriceFile::Document(document) => document.prices,
            PriceFile::Points(points) => points,
        };

        let converted = convert_currency(&history.prices, &rates);
        if converted.is_empty() {
            return Err(DataError::MissingFxRates(target.code().to_string()));
        }

        debug!(
            "Converted {} of {} prices to {}",
            converted.len(),
            history.prices.len(),
            target.code()
        );
        history.prices = converted;
        history.currency = target;
        Ok(history)
    }
}

#[async_trait]
impl PriceSource for JsonFileSource {
    async fn load(&self, query: &HistoryQuery) -> Result<PriceHistory, DataError> {
        let path = self.asset_path(query);
        self.load_file(&path, query).await
    }
}

async fn read_price_file(path: &Path) -> Result<PriceFile, DataError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::Asset;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) {
        fs::write(dir.path().join(name), body).unwrap();
    }

    #[tokio::test]
    async fn test_load_bare_points_sorted() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "gold.json",
            r#"[{"date": "2024-01-03", "price": 102.5},
                {"date": "2024-01-01", "price": 100.0},
                {"date": "2024-01-02", "price": 101.0}]"#,
        );

        let source = JsonFileSource::new(dir.path());
        let history = source.load(&HistoryQuery::new(Asset::Gold)).await.unwrap();

        assert_eq!(history.symbol, "GLD");
        assert_eq!(history.currency, Currency::Usd);
        assert_eq!(history.prices.len(), 3);
        assert_eq!(history.latest().unwrap().price, 102.5);
        assert_eq!(history.prices[0].date, "2024-01-01");
    }

    #[tokio::test]
    async fn test_load_converts_to_jpy() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "btc.json",
            r#"{"asset": "btc", "symbol": "BTC-USD", "years": 1, "currency": "usd",
                "prices": [{"date": "2024-01-01", "price": 1.0},
                           {"date": "2024-01-02", "price": 2.0}]}"#,
        );
        write(
            &dir,
            "fx_jpy.json",
            r#"[{"date": "2024-01-01", "price": 100.0},
                {"date": "2024-01-02", "price": 110.0}]"#,
        );

        let source = JsonFileSource::new(dir.path());
        let query = HistoryQuery::new(Asset::Btc).with_years(2).with_currency(Currency::Jpy);
        let history = source.load(&query).await.unwrap();

        assert_eq!(history.currency, Currency::Jpy);
        assert_eq!(history.years, 2);
        assert_eq!(history.prices[0].price, 100.0);
        assert_eq!(history.prices[1].price, 220.0);
    }

    #[tokio::test]
    async fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let source = JsonFileSource::new(dir.path());

        let missing = source.load(&HistoryQuery::new(Asset::Reit)).await;
        assert!(matches!(missing, Err(DataError::Io(_))));

        write(&dir, "reit.json", "[]");
        let empty = source.load(&HistoryQuery::new(Asset::Reit)).await;
        assert!(matches!(empty, Err(DataError::EmptyHistory(_))));

        write(&dir, "reit.json", "{not json");
        let broken = source.load(&HistoryQuery::new(Asset::Reit)).await;
        assert!(matches!(broken, Err(DataError::Parse(_))));

        write(&dir, "reit.json", r#"[{"date": "2024-01-01", "price": 1e400}]"#);
        let overflow = source.load(&HistoryQuery::new(Asset::Reit)).await;
        assert!(matches!(overflow, Err(DataError::Parse(_))));

        let years = source.load(&HistoryQuery::new(Asset::Reit).with_years(11)).await;
        assert!(matches!(years, Err(DataError::InvalidYears { .. })));
    }

    #[tokio::test]
    async fn test_load_without_fx_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "gold.json", r#"[{"date": "2024-01-01", "price": 10.0}]"#);
        write(&dir, "fx_jpy.json", r#"[{"date": "2024-02-01", "price": 150.0}]"#);

        let source = JsonFileSource::new(dir.path());
        let query = HistoryQuery::new(Asset::Gold).with_currency(Currency::Jpy);
        let result = source.load(&query).await;
        assert!(matches!(result, Err(DataError::MissingFxRates(_))));
    }
}
