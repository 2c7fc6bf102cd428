//! Terminal rendering of backtest results.
//!
//! Formatting is stateless and keyed by the currency of the run; the
//! backtest itself never formats numbers.

use crate::backtest::{recent_high, BacktestResult, Multiplier, PerformanceMetrics, RecentHigh};
use dipdca_common::data::{Currency, PriceHistory};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

/// Format an amount the way the currency is usually written, e.g. `$1,234.57`
/// or `¥1,235`. Non-finite values format as zero.
pub fn format_currency(value: f64, currency: Currency) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let digits = currency.fraction_digits();
    let rounded = round_abs(value, digits);
    let sign = if value < 0.0 { "-" } else { "" };

    format!(
        "{}{}{}",
        sign,
        currency.sign(),
        group_thousands(&format!("{:.*}", digits as usize, rounded))
    )
}

/// Format a fraction as a percent with at most one decimal, e.g. `0.123 -> 12.3%`
pub fn format_percent(fraction: f64) -> String {
    let value = if fraction.is_finite() { fraction * 100.0 } else { 0.0 };
    let rounded = round_abs(value, 1).normalize();
    if rounded.is_zero() {
        return "0%".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}%", sign, group_thousands(&rounded.to_string()))
}

fn round_abs(value: f64, digits: u32) -> Decimal {
    Decimal::from_f64(value.abs())
        .unwrap_or_default()
        .round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
}

/// Insert `,` every three digits of the integer part
fn group_thousands(number: &str) -> String {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (number, None),
    };

    let mut grouped = String::with_capacity(number.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

/// What the strategy says to do on the latest date
#[derive(Debug, Clone, PartialEq)]
pub struct TodaySummary {
    pub symbol: String,
    pub date: String,
    pub price: f64,
    pub multiplier: Multiplier,
    pub amount_today: f64,
    pub base_amount: f64,
    pub recent_high: Option<RecentHigh>,
}

impl TodaySummary {
    /// `None` when the history has no prices
    pub fn from_history(
        history: &PriceHistory,
        result: &BacktestResult,
        base_amount: f64,
        lookback: usize,
    ) -> Option<Self> {
        let latest = history.latest()?;
        let multiplier = result.latest_multiplier();

        Some(Self {
            symbol: history.symbol.clone(),
            date: latest.date.clone(),
            price: latest.price,
            multiplier,
            amount_today: base_amount * multiplier.factor(),
            base_amount,
            recent_high: recent_high(&history.prices, lookback),
        })
    }

    pub fn render(&self, currency: Currency) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} close on {}: {}",
            self.symbol,
            self.date,
            format_currency(self.price, currency)
        );
        let _ = writeln!(out, "  Multiplier:      {:.1}x", self.multiplier.factor());
        let _ = writeln!(out, "  Invest today:    {}", format_currency(self.amount_today, currency));
        let _ = writeln!(out, "  Base amount:     {}", format_currency(self.base_amount, currency));
        match &self.recent_high {
            Some(high) => {
                let _ = writeln!(
                    out,
                    "  Recent high:     {} ({})",
                    format_currency(high.price, currency),
                    high.date
                );
                let _ = writeln!(out, "  Drop from high:  {}", format_percent(high.drop_pct));
            }
            None => {
                let _ = writeln!(out, "  Recent high:     no data");
            }
        }
        out
    }
}

/// Side-by-side comparison of baseline and strategy metrics
pub fn render_summary(result: &BacktestResult, currency: Currency) -> String {
    let baseline = &result.metrics.baseline;
    let strategy = &result.metrics.strategy;

    let rows: [(&str, fn(&PerformanceMetrics, Currency) -> String); 7] = [
        ("Final value", |m, c| format_currency(m.final_value, c)),
        ("Total invested", |m, c| format_currency(m.total_invested, c)),
        ("Profit", |m, c| format_currency(m.profit, c)),
        ("Profit %", |m, _| format_percent(m.profit_pct / 100.0)),
        ("Return multiple", |m, _| format!("{:.2}x", m.return_multiple)),
        ("Annualized", |m, _| format_percent(m.annualized_return_pct / 100.0)),
        ("Max drawdown", |m, _| format_percent(m.max_drawdown_pct / 100.0)),
    ];

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Backtest over {} prices ({} to {})",
        result.dates.len(),
        result.dates.first().map(String::as_str).unwrap_or("-"),
        result.dates.last().map(String::as_str).unwrap_or("-"),
    );
    let _ = writeln!(out, "{:<16} {:>18} {:>18}", "", "Baseline", "Strategy");
    for (label, cell) in rows {
        let _ = writeln!(
            out,
            "{:<16} {:>18} {:>18}",
            label,
            cell(baseline, currency),
            cell(strategy, currency)
        );
    }
    out
}
