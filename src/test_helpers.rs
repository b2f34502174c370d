use crate::config::Config;
use crate::models::{BacktestResult, Metrics, Trade};

/// Five daily bars with one round-trip trade and a full metrics block.
pub fn sample_result() -> BacktestResult {
    let mut metrics = Metrics::new();
    metrics.insert("sharpe".to_string(), Some(1.234));
    metrics.insert("sortino".to_string(), Some(1.871));
    metrics.insert("max_drawdown".to_string(), Some(-0.153));
    metrics.insert("cagr".to_string(), Some(0.0821));
    metrics.insert("volatility".to_string(), Some(0.1942));
    metrics.insert("win_rate".to_string(), Some(0.0));
    metrics.insert("profit_factor".to_string(), None);

    BacktestResult {
        equity: vec![10_000.0, 10_120.0, 9_850.0, 9_910.0, 10_400.0],
        labels: (1..=5)
            .map(|d| format!("2024-01-{:02}T00:00:00", d))
            .collect(),
        price: vec![185.2, 187.4, 182.1, 183.0, 191.6],
        signals: vec![0, 1, -1, 0, 1],
        metrics: Some(metrics),
        trades: vec![
            Trade {
                kind: "LONG".to_string(),
                entry_date: "2024-01-02T00:00:00".to_string(),
                entry_price: Some(187.4),
                exit_date: Some("2024-01-03T00:00:00".to_string()),
                exit_price: Some(182.1),
                ret: Some(-0.0532),
            },
            Trade {
                kind: "LONG".to_string(),
                entry_date: "2024-01-05T00:00:00".to_string(),
                entry_price: Some(191.6),
                exit_date: None,
                exit_price: None,
                ret: None,
            },
        ],
    }
}

/// A Config suitable for testing: nothing read from the environment.
pub fn default_test_config() -> Config {
    Config {
        api_base_url: "http://127.0.0.1:9".to_string(),
        report_dir: std::env::temp_dir()
            .join("quant_backtester_test")
            .to_string_lossy()
            .to_string(),
        log_level: "error".to_string(),
        ..Config::default()
    }
}
