use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Strategy, StrategyParams};

/// Historical-data provider the service loads bars from.
pub const DATA_SOURCE: &str = "yfinance";
/// Daily bars.
pub const BAR_INTERVAL: &str = "1d";
pub const INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Body of `POST /backtest/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub ticker: String,
    pub strategy: Strategy,
    pub params: StrategyParams,
    pub period: Period,
    pub source: String,
    pub interval: String,
    pub initial_capital: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape() {
        let req = BacktestRequest {
            ticker: "SPY".to_string(),
            strategy: Strategy::Breakout,
            params: StrategyParams::Breakout { window: 20.0 },
            period: Period::new(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            ),
            source: DATA_SOURCE.to_string(),
            interval: BAR_INTERVAL.to_string(),
            initial_capital: INITIAL_CAPITAL,
        };

        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "ticker": "SPY",
                "strategy": "breakout",
                "params": {"window": 20},
                "period": {"start": "2020-01-01", "end": "2021-01-01"},
                "source": "yfinance",
                "interval": "1d",
                "initial_capital": 10000.0
            })
        );
    }

    #[test]
    fn period_days() {
        let p = Period::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert_eq!(p.days(), 30);
    }
}
