use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    MaCrossover,
    MeanReversion,
    Breakout,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::MaCrossover,
        Strategy::MeanReversion,
        Strategy::Breakout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::MaCrossover => "ma_crossover",
            Strategy::MeanReversion => "mean_reversion",
            Strategy::Breakout => "breakout",
        }
    }

    /// Human label shown in selectors and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::MaCrossover => "MA Crossover",
            Strategy::MeanReversion => "Mean Reversion",
            Strategy::Breakout => "Breakout",
        }
    }

    /// Parameter keys this strategy forwards to the service.
    pub fn param_keys(&self) -> &'static [ParamKey] {
        match self {
            Strategy::MaCrossover => &[ParamKey::Fast, ParamKey::Slow],
            Strategy::MeanReversion => &[ParamKey::Window, ParamKey::StdK],
            Strategy::Breakout => &[ParamKey::Window],
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Strategy> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "ma_crossover" | "ma" | "crossover" => Some(Strategy::MaCrossover),
            "mean_reversion" | "mr" | "reversion" => Some(Strategy::MeanReversion),
            "breakout" | "bo" => Some(Strategy::Breakout),
            _ => None,
        }
    }
}

/// Every numeric input the parameters form can hold, across all strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKey {
    Fast,
    Slow,
    Window,
    StdK,
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ParamKey {
    pub const ALL: [ParamKey; 4] = [ParamKey::Fast, ParamKey::Slow, ParamKey::Window, ParamKey::StdK];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::Fast => "fast",
            ParamKey::Slow => "slow",
            ParamKey::Window => "window",
            ParamKey::StdK => "std_k",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParamKey::Fast => "Fast MA",
            ParamKey::Slow => "Slow MA",
            ParamKey::Window => "Window",
            ParamKey::StdK => "Std K",
        }
    }

    /// Lower bound suggested to the user. Not enforced.
    pub fn input_hint_min(&self) -> Option<f64> {
        match self {
            ParamKey::Fast => Some(2.0),
            ParamKey::Slow => Some(3.0),
            ParamKey::Window => Some(5.0),
            ParamKey::StdK => None,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<ParamKey> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Some(ParamKey::Fast),
            "slow" => Some(ParamKey::Slow),
            "window" => Some(ParamKey::Window),
            "std_k" | "stdk" | "k" => Some(ParamKey::StdK),
            _ => None,
        }
    }
}

/// Parameters actually sent for one strategy. Serializes as the bare
/// params object, e.g. `{"fast": 20, "slow": 50}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategyParams {
    MaCrossover {
        #[serde(serialize_with = "serialize_number")]
        fast: f64,
        #[serde(serialize_with = "serialize_number")]
        slow: f64,
    },
    MeanReversion {
        #[serde(serialize_with = "serialize_number")]
        window: f64,
        #[serde(serialize_with = "serialize_number")]
        std_k: f64,
    },
    Breakout {
        #[serde(serialize_with = "serialize_number")]
        window: f64,
    },
}

// Whole numbers are written as JSON integers (`20`, not `20.0`).
fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl StrategyParams {
    pub fn strategy(&self) -> Strategy {
        match self {
            StrategyParams::MaCrossover { .. } => Strategy::MaCrossover,
            StrategyParams::MeanReversion { .. } => Strategy::MeanReversion,
            StrategyParams::Breakout { .. } => Strategy::Breakout,
        }
    }
}

impl fmt::Display for StrategyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyParams::MaCrossover { fast, slow } => write!(f, "fast={} slow={}", fast, slow),
            StrategyParams::MeanReversion { window, std_k } => {
                write!(f, "window={} std_k={}", window, std_k)
            }
            StrategyParams::Breakout { window } => write!(f, "window={}", window),
        }
    }
}

/// Catalog entry returned by `GET /backtest/strategies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Catalog entry returned by `GET /data/tickers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub symbol: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}
