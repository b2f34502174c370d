use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::Config;
use crate::models::{ParamKey, Period, Strategy};

/// Ticker hints offered to the user. Any symbol is accepted.
pub const PRESET_TICKERS: &[&str] = &["AAPL", "MSFT", "GOOG", "SPY", "BTC-USD"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown parameter '{0}' (expected fast, slow, window or std_k)")]
    UnknownParam(String),

    #[error("unknown strategy '{0}' (expected ma_crossover, mean_reversion or breakout)")]
    UnknownStrategy(String),

    #[error("{key} must be a finite number, got {value}")]
    NotFinite { key: ParamKey, value: f64 },

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a YYYY-MM-DD date")]
    InvalidDate(String),
}

/// Values for every strategy's inputs, kept side by side so switching
/// strategy does not lose what the user typed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamValues {
    pub fast: f64,
    pub slow: f64,
    pub window: f64,
    pub std_k: f64,
}

impl Default for ParamValues {
    fn default() -> Self {
        Self {
            fast: 20.0,
            slow: 50.0,
            window: 20.0,
            std_k: 2.0,
        }
    }
}

impl ParamValues {
    pub fn get(&self, key: ParamKey) -> f64 {
        match key {
            ParamKey::Fast => self.fast,
            ParamKey::Slow => self.slow,
            ParamKey::Window => self.window,
            ParamKey::StdK => self.std_k,
        }
    }

    fn slot(&mut self, key: ParamKey) -> &mut f64 {
        match key {
            ParamKey::Fast => &mut self.fast,
            ParamKey::Slow => &mut self.slow,
            ParamKey::Window => &mut self.window,
            ParamKey::StdK => &mut self.std_k,
        }
    }
}

/// One user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    SetTicker(String),
    SetStrategy(Strategy),
    SetParam(ParamKey, f64),
    SetPeriod(NaiveDate, NaiveDate),
}

/// Non-blocking observation about the current inputs. The request is
/// still built and sent; the service decides what to do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    EmptyTicker,
    FastNotBelowSlow { fast: f64, slow: f64 },
    WindowTooShort { window: f64 },
    PeriodNotOrdered { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::EmptyTicker => write!(f, "ticker is empty"),
            Advisory::FastNotBelowSlow { fast, slow } => {
                write!(f, "fast ({}) is not below slow ({})", fast, slow)
            }
            Advisory::WindowTooShort { window } => write!(f, "window ({}) is shorter than 2 bars", window),
            Advisory::PeriodNotOrdered { start, end } => {
                write!(f, "start {} is not before end {}", start, end)
            }
        }
    }
}

/// What the user has typed so far. Edits are applied as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationState {
    pub ticker: String,
    pub strategy: Strategy,
    pub params: ParamValues,
    pub period: Period,
}

impl Default for ConfigurationState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl ConfigurationState {
    pub fn new(cfg: &Config) -> Self {
        Self {
            ticker: cfg.default_ticker.clone(),
            strategy: Strategy::MaCrossover,
            params: ParamValues::default(),
            period: Period::new(cfg.default_start, cfg.default_end),
        }
    }

    pub fn set_ticker(&mut self, ticker: impl Into<String>) {
        self.ticker = ticker.into().trim().to_string();
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    pub fn set_param(&mut self, key: ParamKey, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite { key, value });
        }
        *self.params.slot(key) = value;
        Ok(())
    }

    /// `set_param` keyed by the wire name (`fast`, `slow`, `window`, `std_k`).
    pub fn set_param_named(&mut self, key: &str, value: f64) -> Result<(), ConfigError> {
        let key = ParamKey::from_str_loose(key).ok_or_else(|| ConfigError::UnknownParam(key.to_string()))?;
        self.set_param(key, value)
    }

    pub fn set_period(&mut self, start: NaiveDate, end: NaiveDate) {
        self.period = Period::new(start, end);
    }

    pub fn apply(&mut self, action: ConfigAction) -> Result<(), ConfigError> {
        match action {
            ConfigAction::SetTicker(t) => self.set_ticker(t),
            ConfigAction::SetStrategy(s) => self.set_strategy(s),
            ConfigAction::SetParam(k, v) => self.set_param(k, v)?,
            ConfigAction::SetPeriod(start, end) => self.set_period(start, end),
        }
        Ok(())
    }

    /// Cross-field observations for the active strategy only.
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut out = Vec::new();
        if self.ticker.is_empty() {
            out.push(Advisory::EmptyTicker);
        }
        match self.strategy {
            Strategy::MaCrossover => {
                if self.params.fast >= self.params.slow {
                    out.push(Advisory::FastNotBelowSlow {
                        fast: self.params.fast,
                        slow: self.params.slow,
                    });
                }
            }
            Strategy::MeanReversion | Strategy::Breakout => {
                if self.params.window < 2.0 {
                    out.push(Advisory::WindowTooShort {
                        window: self.params.window,
                    });
                }
            }
        }
        if self.period.start >= self.period.end {
            out.push(Advisory::PeriodNotOrdered {
                start: self.period.start,
                end: self.period.end,
            });
        }
        out
    }
}

pub fn parse_strategy(s: &str) -> Result<Strategy, ConfigError> {
    Strategy::from_str_loose(s).ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate(s.to_string()))
}

pub fn parse_number(s: &str) -> Result<f64, ConfigError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::NotANumber(s.to_string()))
}
