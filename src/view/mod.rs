pub mod format;
pub mod report;
pub mod series;

pub use format::{classify, format_metric, format_tick, Classification, MetricRow, TradeRow, METRICS};
pub use report::ReportRenderer;
pub use series::{ChartPoint, PricePoint, SignalOverlay};

use serde::Serialize;

use crate::models::BacktestResult;

const AXIS_TICKS: usize = 5;

/// Display-ready projection of a result. Pure: the same result always
/// yields the same view.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViewModel {
    /// `None` until a run has produced metrics.
    pub metrics: Option<Vec<MetricRow>>,
    pub trades: Vec<TradeRow>,
    pub equity: Vec<ChartPoint>,
    pub equity_ticks: Vec<String>,
    pub price: Vec<PricePoint>,
    pub overlay: SignalOverlay,
}

impl ViewModel {
    pub fn from_result(result: &BacktestResult) -> Self {
        let metrics = result.metrics.as_ref().map(|m| {
            METRICS
                .iter()
                .map(|spec| MetricRow::new(spec, m.get(spec.key).copied().flatten()))
                .collect()
        });

        let equity = series::equity_series(&result.labels, &result.equity);
        let equity_values: Vec<f64> = equity.iter().map(|p| p.value).collect();
        let price = series::price_series(&result.labels, &result.price, &result.signals);
        let overlay = series::partition_signals(&price);

        Self {
            metrics,
            trades: result.trades.iter().map(TradeRow::from).collect(),
            equity_ticks: series::axis_ticks(&equity_values, AXIS_TICKS),
            equity,
            price,
            overlay,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_none() && self.trades.is_empty() && self.equity.is_empty() && self.price.is_empty()
    }
}
