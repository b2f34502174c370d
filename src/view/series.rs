//! Index-aligned chart series.
//!
//! `labels`, `equity`, `price` and `signals` describe the same dates
//! position by position. When their lengths disagree, series are cut to
//! the shortest of the sequences being zipped. Signals are the exception:
//! a signal sequence shorter than the price series is padded with `0`
//! ("no action"), so price points are never dropped for lack of signals.
//! Points whose value was `null` on the wire (`NaN` here) are aligned
//! first and then left off the chart.

use serde::Serialize;
use tracing::debug;

use crate::view::format::format_tick;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub label: String,
    pub price: f64,
    pub signal: i64,
}

/// Entry/exit markers drawn over the price line.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SignalOverlay {
    pub buys: Vec<PricePoint>,
    pub sells: Vec<PricePoint>,
}

pub fn equity_series(labels: &[String], equity: &[f64]) -> Vec<ChartPoint> {
    let n = labels.len().min(equity.len());
    if n != labels.len() || n != equity.len() {
        debug!(
            "equity series truncated to {} (labels={}, equity={})",
            n,
            labels.len(),
            equity.len()
        );
    }
    labels
        .iter()
        .zip(equity)
        .filter(|(_, value)| value.is_finite())
        .map(|(label, &value)| ChartPoint {
            label: label.clone(),
            value,
        })
        .collect()
}

pub fn price_series(labels: &[String], price: &[f64], signals: &[i64]) -> Vec<PricePoint> {
    let n = labels.len().min(price.len());
    if n != labels.len() || n != price.len() || signals.len() < n {
        debug!(
            "price series aligned to {} (labels={}, price={}, signals={})",
            n,
            labels.len(),
            price.len(),
            signals.len()
        );
    }
    (0..n)
        .filter(|&i| price[i].is_finite())
        .map(|i| PricePoint {
            label: labels[i].clone(),
            price: price[i],
            signal: signals.get(i).copied().unwrap_or(0),
        })
        .collect()
}

/// Split points into buy (`1`) and sell (`-1`) markers. Anything else
/// stays on the base line only.
pub fn partition_signals(points: &[PricePoint]) -> SignalOverlay {
    let mut overlay = SignalOverlay::default();
    for p in points {
        match p.signal {
            1 => overlay.buys.push(p.clone()),
            -1 => overlay.sells.push(p.clone()),
            _ => {}
        }
    }
    overlay
}

/// `(min, max)` of the finite values, `None` when there are none.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// `count` evenly spaced tick values from `min` to `max` inclusive.
pub fn tick_values(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ if max <= min => vec![min],
        _ => {
            let step = (max - min) / (count - 1) as f64;
            (0..count).map(|i| min + step * i as f64).collect()
        }
    }
}

/// Compressed tick labels spanning the series range.
pub fn axis_ticks(values: &[f64], count: usize) -> Vec<String> {
    match value_range(values.iter().copied()) {
        Some((lo, hi)) => tick_values(lo, hi, count)
            .into_iter()
            .map(format_tick)
            .collect(),
        None => Vec::new(),
    }
}
