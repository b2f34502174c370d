pub mod http;

pub use http::HttpBacktestClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BacktestRequest, BacktestResult, StrategyInfo, TickerInfo};

/// Failure crossing the service boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived with a non-success status.
    #[error("service returned HTTP {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    /// A success response whose body is not JSON of the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

impl ApiError {
    /// The single string shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "Request failed".to_string(),
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Status {
                status,
                detail: None,
            } => format!("HTTP {}", status),
            ApiError::Decode(_) => "Invalid response body".to_string(),
        }
    }
}

#[async_trait]
pub trait BacktestApi: Send + Sync {
    /// `POST /backtest/run`
    async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestResult, ApiError>;

    /// `GET /backtest/strategies`
    async fn list_strategies(&self) -> Result<Vec<StrategyInfo>, ApiError>;

    /// `GET /data/tickers`
    async fn list_tickers(&self) -> Result<Vec<TickerInfo>, ApiError>;
}
