use serde::Serialize;
use std::fmt;

use crate::models::Trade;

/// Shown for a metric the service did not compute.
pub const METRIC_PLACEHOLDER: &str = "—";
/// Shown for a missing trade value. Deliberately different from
/// `METRIC_PLACEHOLDER`: the trade log leaves such cells blank.
pub const TRADE_PLACEHOLDER: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Negative,
    Neutral,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Positive => "positive",
            Classification::Negative => "negative",
            Classification::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Absent or exactly zero is neutral.
pub fn classify(value: Option<f64>) -> Classification {
    match value {
        Some(v) if v > 0.0 => Classification::Positive,
        Some(v) if v < 0.0 => Classification::Negative,
        _ => Classification::Neutral,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricFormat {
    /// Raw value, 2 decimals.
    Ratio,
    /// Fraction shown as a percentage, 2 decimals.
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub format: MetricFormat,
}

/// Display order of the metrics panel.
pub const METRICS: [MetricSpec; 7] = [
    MetricSpec { key: "sharpe", label: "Sharpe", format: MetricFormat::Ratio },
    MetricSpec { key: "sortino", label: "Sortino", format: MetricFormat::Ratio },
    MetricSpec { key: "max_drawdown", label: "Max DD", format: MetricFormat::Percent },
    MetricSpec { key: "cagr", label: "CAGR", format: MetricFormat::Percent },
    MetricSpec { key: "volatility", label: "Volatility", format: MetricFormat::Percent },
    MetricSpec { key: "win_rate", label: "Win Rate", format: MetricFormat::Percent },
    MetricSpec { key: "profit_factor", label: "Profit Factor", format: MetricFormat::Ratio },
];

pub fn metric_spec(key: &str) -> Option<&'static MetricSpec> {
    METRICS.iter().find(|m| m.key == key)
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn format_metric(value: Option<f64>, format: MetricFormat) -> String {
    match (value, format) {
        (None, _) => METRIC_PLACEHOLDER.to_string(),
        (Some(v), MetricFormat::Ratio) => format!("{:.2}", v),
        (Some(v), MetricFormat::Percent) => format_percent(v),
    }
}

/// Compact y-axis label: `2500 -> "3k"`, `999 -> "999"`.
pub fn format_tick(value: f64) -> String {
    if value >= 1000.0 || value <= -1000.0 {
        format!("{}k", round_to_int(value / 1000.0))
    } else {
        round_to_int(value).to_string()
    }
}

// Half away from zero, and never "-0".
fn round_to_int(v: f64) -> i64 {
    let r = v.round() as i64;
    if r == 0 {
        0
    } else {
        r
    }
}

pub fn format_price(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| TRADE_PLACEHOLDER.to_string())
}

pub fn format_trade_return(value: Option<f64>) -> String {
    value
        .map(format_percent)
        .unwrap_or_else(|| TRADE_PLACEHOLDER.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub key: &'static str,
    pub label: &'static str,
    pub value: Option<f64>,
    pub display: String,
    pub class: Classification,
}

impl MetricRow {
    pub fn new(spec: &MetricSpec, value: Option<f64>) -> Self {
        Self {
            key: spec.key,
            label: spec.label,
            value,
            display: format_metric(value, spec.format),
            class: classify(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub kind: String,
    pub entry_date: String,
    pub entry_price: String,
    pub exit_date: String,
    pub exit_price: String,
    pub ret: String,
    pub ret_class: Classification,
}

impl From<&Trade> for TradeRow {
    fn from(t: &Trade) -> Self {
        Self {
            kind: t.kind.clone(),
            entry_date: t.entry_date.clone(),
            entry_price: format_price(t.entry_price),
            exit_date: t.exit_date.clone().unwrap_or_default(),
            exit_price: format_price(t.exit_price),
            ret: format_trade_return(t.ret),
            ret_class: classify(t.ret),
        }
    }
}
