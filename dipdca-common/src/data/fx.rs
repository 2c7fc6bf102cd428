// =================================================================
// data/fx.rs - Currency Conversion and Range Trimming
// =================================================================

use super::types::{parse_date, PricePoint};
use chrono::Duration;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::debug;

/// Decimal places kept on converted prices
const PRICE_DP: u32 = 4;

/// Convert an ascending price series with a USD cross rate series.
///
/// Each price is multiplied by the rate quoted on the same date, or by the
/// most recent earlier quote when that date has none. Prices dated before the
/// first usable quote are dropped.
pub fn convert_currency(prices: &[PricePoint], rates: &[PricePoint]) -> Vec<PricePoint> {
    let mut quotes: Vec<_> = rates
        .iter()
        .filter(|rate| rate.is_valid())
        .filter_map(|rate| rate.timestamp().map(|ts| (ts, rate.price)))
        .collect();
    quotes.sort_by_key(|(ts, _)| *ts);

    let mut converted = Vec::with_capacity(prices.len());
    let mut cursor = 0;
    let mut current_rate = None;

    for point in prices {
        let Some(ts) = point.timestamp() else {
            debug!("Skipping price with unparseable date '{}'", point.date);
            continue;
        };

        while cursor < quotes.len() && quotes[cursor].0 <= ts {
            current_rate = Some(quotes[cursor].1);
            cursor += 1;
        }

        let Some(rate) = current_rate else {
            continue;
        };

        let value = round_price(point.price * rate);
        if value.is_finite() {
            converted.push(PricePoint::new(point.date.clone(), value));
        }
    }

    converted
}

/// Keep the points within `years` (plus a week of slack) of the last date.
pub fn trim_to_years(prices: Vec<PricePoint>, years: u32) -> Vec<PricePoint> {
    let Some(last) = prices.last().and_then(PricePoint::timestamp) else {
        return prices;
    };
    let cutoff = last - Duration::days(i64::from(years) * 365 + 7);

    prices
        .into_iter()
        .filter(|point| parse_date(&point.date).is_some_and(|ts| ts >= cutoff))
        .collect()
}

fn round_price(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(PRICE_DP))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(&str, f64)]) -> Vec<PricePoint> {
        points
            .iter()
            .map(|(date, price)| PricePoint::new(*date, *price))
            .collect()
    }

    #[test]
    fn test_convert_same_dates() {
        let prices = series(&[("2024-01-01", 1.0), ("2024-01-02", 2.0)]);
        let rates = series(&[("2024-01-01", 100.0), ("2024-01-02", 110.0)]);

        let converted = convert_currency(&prices, &rates);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].price, 100.0);
        assert_eq!(converted[1].price, 220.0);
    }

    #[test]
    fn test_convert_forward_fills_missing_rates() {
        let prices = series(&[
            ("2024-01-01", 1.0),
            ("2024-01-02", 1.0),
            ("2024-01-03", 1.0),
            ("2024-01-06", 1.0),
        ]);
        let rates = series(&[("2024-01-02", 150.0), ("2024-01-05", 151.0)]);

        let converted = convert_currency(&prices, &rates);
        let dates: Vec<_> = converted.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-03", "2024-01-06"]);
        assert_eq!(converted[1].price, 150.0);
        assert_eq!(converted[2].price, 151.0);
    }

    #[test]
    fn test_convert_rounds_to_four_places() {
        let prices = series(&[("2024-01-01", 1.123456)]);
        let rates = series(&[("2024-01-01", 1.0)]);
        assert_eq!(convert_currency(&prices, &rates)[0].price, 1.1235);
    }

    #[test]
    fn test_convert_without_rates() {
        let prices = series(&[("2024-01-01", 1.0)]);
        assert!(convert_currency(&prices, &[]).is_empty());
        assert!(convert_currency(&prices, &series(&[("2024-01-01", 0.0)])).is_empty());
    }

    #[test]
    fn test_trim_to_years() {
        let prices = series(&[
            ("2020-01-01", 1.0),
            ("2022-12-20", 2.0),
            ("2023-06-01", 3.0),
            ("2024-01-01", 4.0),
        ]);

        let trimmed = trim_to_years(prices.clone(), 1);
        let dates: Vec<_> = trimmed.iter().map(|p| p.date.as_str()).collect();
        // 2024-01-01 minus 372 days is 2022-12-25
        assert_eq!(dates, vec!["2023-06-01", "2024-01-01"]);

        assert_eq!(trim_to_years(prices, 10).len(), 4);
        assert!(trim_to_years(Vec::new(), 1).is_empty());
    }
}
