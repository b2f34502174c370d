use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::client::{ApiError, BacktestApi};
use crate::config::Config;
use crate::models::{BacktestRequest, BacktestResult, ErrorBody, StrategyInfo, TickerInfo};

const RUN_PATH: &str = "/backtest/run";
const STRATEGIES_PATH: &str = "/backtest/strategies";
const TICKERS_PATH: &str = "/data/tickers";

/// reqwest-backed client for the backtest service.
#[derive(Debug, Clone)]
pub struct HttpBacktestClient {
    client: Client,
    base_url: String,
}

impl HttpBacktestClient {
    pub fn new(cfg: &Config) -> Self {
        Self::with_base_url(&cfg.api_base_url)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode_success(check_status(resp).await?).await
    }
}

/// Turn a non-success response into `ApiError::Status`, reading the
/// optional `{"detail": ...}` body on a best-effort basis.
async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.bytes().await.unwrap_or_default();
    let detail = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail_message());

    if detail.is_none() && !body.is_empty() {
        debug!("Unstructured error body ({} bytes) for HTTP {}", body.len(), status.as_u16());
    }

    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}

async fn decode_success<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let body = resp
        .bytes()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    serde_json::from_slice(&body).map_err(|e| {
        warn!("Failed to decode response body: {}", e);
        ApiError::Decode(e.to_string())
    })
}

#[async_trait]
impl BacktestApi for HttpBacktestClient {
    async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestResult, ApiError> {
        debug!(
            "POST {} ticker={} strategy={} params={{{}}}",
            RUN_PATH, request.ticker, request.strategy, request.params
        );

        let resp = self
            .client
            .post(self.url(RUN_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        decode_success(check_status(resp).await?).await
    }

    async fn list_strategies(&self) -> Result<Vec<StrategyInfo>, ApiError> {
        self.get_json(STRATEGIES_PATH).await
    }

    async fn list_tickers(&self) -> Result<Vec<TickerInfo>, ApiError> {
        self.get_json(TICKERS_PATH).await
    }
}
