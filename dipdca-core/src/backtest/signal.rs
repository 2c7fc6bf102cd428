// dipdca-core/src/backtest/signal.rs

use super::types::Multiplier;
use dipdca_common::data::PricePoint;
use serde::{Deserialize, Serialize};

/// Normalized signal parameters, thresholds as fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalParams {
    pub lookback: usize,
    pub tier2: f64,
    pub tier3: f64,
}

impl SignalParams {
    /// Clamp caller input: lookback to at least 1, tier2 to at least 0 and
    /// tier3 to at least tier2, then convert percents to fractions.
    pub fn from_percent(lookback_days: i64, tier2_pct: f64, tier3_pct: f64) -> Self {
        let tier2_pct = tier2_pct.max(0.0);
        let tier3_pct = tier3_pct.max(tier2_pct);

        Self {
            lookback: usize::try_from(lookback_days.max(1)).unwrap_or(usize::MAX),
            tier2: tier2_pct / 100.0,
            tier3: tier3_pct / 100.0,
        }
    }

    pub fn multiplier_at(&self, prices: &[PricePoint], index: usize) -> Multiplier {
        compute_multiplier(prices, index, self.lookback, self.tier2, self.tier3)
    }
}

/// Multiplier for `prices[index]` given its drawdown from the rolling high.
///
/// The window covers `[index + 1 - lookback, index]` of the slice as given,
/// so points a simulation later skips still count towards the high.
///
/// # Panics
///
/// Panics if `index` is out of bounds.
pub fn compute_multiplier(
    prices: &[PricePoint],
    index: usize,
    lookback: usize,
    tier2: f64,
    tier3: f64,
) -> Multiplier {
    if index == 0 {
        return Multiplier::Base;
    }

    let price = prices[index].price;
    let high = rolling_high(prices, index, lookback);
    if !high.is_finite() || high == 0.0 {
        return Multiplier::Base;
    }

    let drawdown = (high - price) / high;
    Multiplier::for_drawdown(drawdown, tier2, tier3)
}

/// Highest price in the window ending at `index`. NaN if any price in the
/// window is NaN.
pub fn rolling_high(prices: &[PricePoint], index: usize, lookback: usize) -> f64 {
    let start = (index + 1).saturating_sub(lookback.max(1));
    prices[start..=index]
        .iter()
        .map(|point| point.price)
        .fold(prices[index].price, |high, price| {
            if high.is_nan() || price.is_nan() {
                f64::NAN
            } else {
                high.max(price)
            }
        })
}

/// Recent high relative to the latest close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentHigh {
    pub price: f64,
    pub date: String,
    /// Fall from the high to the latest price, as a fraction
    pub drop_pct: f64,
}

/// Highest valid price among the last `lookback` points and how far the latest
/// price sits below it. `None` when no valid price is in range.
pub fn recent_high(prices: &[PricePoint], lookback: usize) -> Option<RecentHigh> {
    let start = prices.len().saturating_sub(lookback.max(1));

    let high = prices[start..]
        .iter()
        .filter(|point| point.is_valid())
        .fold(None, |best: Option<&PricePoint>, point| match best {
            Some(best) if best.price >= point.price => Some(best),
            _ => Some(point),
        })?;

    let latest = prices.last()?.price;
    let drop_pct = if latest.is_finite() && latest >= 0.0 {
        ((high.price - latest) / high.price).max(0.0)
    } else {
        0.0
    };

    Some(RecentHigh {
        price: high.price,
        date: high.date.clone(),
        drop_pct,
    })
}
