use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dipdca_common::data::{Asset, Currency, HistoryQuery, JsonFileSource, PriceSource};
use dipdca_core::{
    backtest::BacktestEngine,
    config::Settings,
    report::{render_summary, TodaySummary},
};

#[derive(Parser)]
#[command(name = "dipdca")]
#[command(about = "Backtest buy-the-dip dollar-cost averaging against a fixed contribution")]
enum Commands {
    /// Run the strategy and the baseline over a saved price history
    Backtest {
        /// reit, gold or btc
        #[arg(short, long)]
        asset: Option<String>,
        /// Read prices from this file instead of the data directory
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        years: Option<u32>,
        /// usd or jpy
        #[arg(short, long)]
        currency: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        base_amount: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lookback: Option<i64>,
        /// Drawdown percent for 2x
        #[arg(long, allow_hyphen_values = true)]
        tier2: Option<f64>,
        /// Drawdown percent for 3x
        #[arg(long, allow_hyphen_values = true)]
        tier3: Option<f64>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List supported assets
    Assets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Commands::parse() {
        Commands::Assets => {
            for asset in Asset::ALL {
                println!("{:<6} {}", asset.key(), asset.symbol());
            }
        }

        Commands::Backtest {
            asset,
            file,
            years,
            currency,
            base_amount,
            lookback,
            tier2,
            tier3,
            json,
        } => {
            let settings = Settings::new().context("Failed to load settings")?;

            let asset: Asset = asset.as_deref().unwrap_or(&settings.data.asset).parse()?;
            let currency: Currency = currency.as_deref().unwrap_or(&settings.data.currency).parse()?;
            let query = HistoryQuery::new(asset)
                .with_years(years.unwrap_or(settings.data.years))
                .with_currency(currency);

            let source = JsonFileSource::new(&settings.data.dir);
            let history = match &file {
                Some(path) => source.load_file(path, &query).await,
                None => source.load(&query).await,
            }
            .with_context(|| format!("Failed to load prices for {}", asset))?;
            info!("Found {} historical data points", history.prices.len());

            let mut config = settings.backtest_config();
            config.base_amount = base_amount.unwrap_or(config.base_amount);
            config.lookback_days = lookback.unwrap_or(config.lookback_days);
            config.tier2_pct = tier2.unwrap_or(config.tier2_pct);
            config.tier3_pct = tier3.unwrap_or(config.tier3_pct);

            let engine = BacktestEngine::new(config);
            let result = engine.run(&history.prices)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            if let Some(today) = TodaySummary::from_history(
                &history,
                &result,
                engine.config().base_amount,
                engine.params().lookback,
            ) {
                println!("{}", today.render(history.currency));
            }
            print!("{}", render_summary(&result, history.currency));
        }
    }

    Ok(())
}
