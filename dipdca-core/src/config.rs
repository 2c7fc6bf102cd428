use crate::backtest::BacktestConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Strategy {
    pub base_amount: f64,
    pub lookback_days: i64,
    pub tier2_pct: f64,
    pub tier3_pct: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub dir: String,
    pub asset: String,
    pub years: u32,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub strategy: Strategy,
    pub data: Data,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_dir = std::env::var("DIPDCA_CONFIG_DIR").unwrap_or_else(|_| "config".into());

        Self::builder(&config_dir, &run_mode)?
            .add_source(
                Environment::with_prefix("DIPDCA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Defaults overlaid with `<dir>/default` and `<dir>/<run_mode>` when present
    fn builder(config_dir: &str, run_mode: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("strategy.base_amount", 100.0)?
            .set_default("strategy.lookback_days", 30)?
            .set_default("strategy.tier2_pct", 10.0)?
            .set_default("strategy.tier3_pct", 20.0)?
            .set_default("data.dir", "data")?
            .set_default("data.asset", "gold")?
            .set_default("data.years", 1)?
            .set_default("data.currency", "usd")?
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false)))
    }

    pub fn backtest_config(&self) -> BacktestConfig {
        BacktestConfig::new(self.strategy.base_amount)
            .with_lookback_days(self.strategy.lookback_days)
            .with_thresholds(self.strategy.tier2_pct, self.strategy.tier3_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load(dir: &str, run_mode: &str) -> Settings {
        Settings::builder(dir, run_mode)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let settings = load(dir.path().to_str().unwrap(), "development");

        assert_eq!(settings.strategy.base_amount, 100.0);
        assert_eq!(settings.strategy.lookback_days, 30);
        assert_eq!(settings.data.dir, "data");
        assert_eq!(settings.data.years, 1);
        assert_eq!(settings.data.currency, "usd");
    }

    #[test]
    fn test_run_mode_file_overrides_default() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[strategy]\nbase_amount = 50.0\ntier3_pct = 30.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("backtest.toml"),
            "[strategy]\nbase_amount = 75.0\n\n[data]\ncurrency = \"jpy\"\n",
        )
        .unwrap();

        let settings = load(dir.path().to_str().unwrap(), "backtest");
        assert_eq!(settings.strategy.base_amount, 75.0);
        assert_eq!(settings.strategy.tier3_pct, 30.0);
        assert_eq!(settings.data.currency, "jpy");

        let config = settings.backtest_config();
        assert_eq!(config.base_amount, 75.0);
        assert_eq!(config.tier2_pct, 10.0);
        assert_eq!(config.tier3_pct, 30.0);
    }
}
