use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Metric name to value; `None` means the service could not compute it.
pub type Metrics = BTreeMap<String, Option<f64>>;

/// Success body of `POST /backtest/run`.
///
/// Every field tolerates being missing or `null` and falls back to an
/// empty sequence (or `None` for metrics). A `null` inside `equity` or
/// `price` keeps its position as `NaN`; a `null` label becomes `""`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestResult {
    #[serde(default, deserialize_with = "deserialize_values")]
    pub equity: Vec<f64>,
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_values")]
    pub price: Vec<f64>,
    #[serde(default, deserialize_with = "deserialize_signals")]
    pub signals: Vec<i64>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    pub fn is_empty(&self) -> bool {
        self.equity.is_empty()
            && self.labels.is_empty()
            && self.price.is_empty()
            && self.signals.is_empty()
            && self.metrics.is_none()
            && self.trades.is_empty()
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.as_ref().and_then(|m| m.get(key).copied().flatten())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entry_date: String,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub exit_date: Option<String>,
    #[serde(default)]
    pub exit_price: Option<f64>,
    /// Fractional return, 0.05 = 5%.
    #[serde(rename = "return", default)]
    pub ret: Option<f64>,
}

/// Error body the service may attach to a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The `detail` text, if the service sent a non-empty one.
    ///
    /// Validation failures carry a list of objects instead of a string;
    /// those are passed through as compact JSON.
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_values<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

// Signal columns sometimes arrive as floats (`1.0`) or with `null` holes.
fn deserialize_signals<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => x.round() as i64,
            _ => 0,
        })
        .collect())
}
