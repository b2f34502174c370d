use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::theme::ThemeMode;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_START: &str = "2018-01-01";
pub const DEFAULT_END: &str = "2024-01-01";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Service
    pub api_base_url: String,

    // Session defaults
    pub default_ticker: String,
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
    pub theme: ThemeMode,

    // Output
    pub report_dir: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let date = |key: &str, default: &str| -> NaiveDate {
            let raw = env(key, default);
            match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(d) => d,
                Err(_) => {
                    warn!("{}={} is not a YYYY-MM-DD date, using {}", key, raw, default);
                    parse_default_date(default)
                }
            }
        };

        let theme_raw = env("THEME", "light");
        let theme = ThemeMode::from_str_loose(&theme_raw).unwrap_or_else(|| {
            warn!("THEME={} is not light/dark, using light", theme_raw);
            ThemeMode::Light
        });

        Config {
            api_base_url: env("BACKTEST_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            default_ticker: env("DEFAULT_TICKER", DEFAULT_TICKER),
            default_start: date("DEFAULT_START", DEFAULT_START),
            default_end: date("DEFAULT_END", DEFAULT_END),
            theme,
            report_dir: env("REPORT_DIR", "data"),
            log_level: env("LOG_LEVEL", "info"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            default_ticker: DEFAULT_TICKER.to_string(),
            default_start: parse_default_date(DEFAULT_START),
            default_end: parse_default_date(DEFAULT_END),
            theme: ThemeMode::Light,
            report_dir: "data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn parse_default_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}
