// dipdca-core/src/backtest/metrics.rs

use super::types::PerformanceMetrics;
use chrono::Duration;
use dipdca_common::data::parse_date;

pub struct MetricsCalculator {
    year: Duration,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCalculator {
    pub fn new() -> Self {
        Self {
            year: Duration::days(365),
        }
    }

    /// Derive performance statistics for one finished value series.
    ///
    /// Every ratio falls back to 0 when its denominator is zero, so empty or
    /// all-zero series produce all-zero metrics.
    pub fn calculate(&self, dates: &[String], values: &[f64], total_invested: f64) -> PerformanceMetrics {
        let final_value = values.last().copied().unwrap_or(0.0);
        let profit = final_value - total_invested;
        let profit_pct = if is_nonzero(total_invested) {
            profit / total_invested * 100.0
        } else {
            0.0
        };
        let (max_drawdown, max_drawdown_pct) = self.calculate_drawdown(values);
        let return_multiple = if is_nonzero(total_invested) {
            final_value / total_invested
        } else {
            0.0
        };
        let duration_years = self.calculate_duration_years(dates);

        PerformanceMetrics {
            total_invested,
            final_value,
            profit,
            profit_pct,
            return_multiple,
            annualized_return_pct: self.calculate_annualized_return(return_multiple, duration_years),
            duration_years,
            max_drawdown,
            max_drawdown_pct,
        }
    }

    /// Largest fall from the running peak, absolute and as a negative percent
    /// of the final peak.
    fn calculate_drawdown(&self, values: &[f64]) -> (f64, f64) {
        let mut peak = 0.0_f64;
        let mut max_drawdown = 0.0_f64;

        for &value in values {
            if value > peak {
                peak = value;
            }
            let drawdown = peak - value;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }

        let max_drawdown_pct = if is_nonzero(peak) && max_drawdown > 0.0 {
            -max_drawdown / peak * 100.0
        } else {
            0.0
        };

        (max_drawdown, max_drawdown_pct)
    }

    fn calculate_duration_years(&self, dates: &[String]) -> f64 {
        if dates.len() < 2 {
            return 0.0;
        }

        match (parse_date(&dates[0]), parse_date(&dates[dates.len() - 1])) {
            (Some(start), Some(end)) if end > start => {
                (end - start).num_milliseconds() as f64 / self.year.num_milliseconds() as f64
            }
            _ => 0.0,
        }
    }

    fn calculate_annualized_return(&self, return_multiple: f64, duration_years: f64) -> f64 {
        if duration_years > 0.0 && return_multiple > 0.0 {
            (return_multiple.powf(1.0 / duration_years) - 1.0) * 100.0
        } else {
            0.0
        }
    }
}

fn is_nonzero(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}
