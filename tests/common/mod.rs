#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use quant_backtester::client::{ApiError, BacktestApi};
use quant_backtester::models::{BacktestRequest, BacktestResult, StrategyInfo, TickerInfo};

/// Success body in the shape the service sends, including the chart
/// images the client ignores.
pub const RUN_BODY: &str = r#"{
    "equity": [10000.0, 10250.0, 9980.0, 10610.0],
    "labels": ["2023-01-03T00:00:00", "2023-01-04T00:00:00", "2023-01-05T00:00:00", "2023-01-06T00:00:00"],
    "price": [125.07, 126.36, 125.02, 129.62],
    "signals": [1, 0, -1, 1],
    "metrics": {"sharpe": 1.234, "sortino": 2.01, "max_drawdown": -0.153, "cagr": 0.21,
                "volatility": 0.25, "win_rate": 0.5, "profit_factor": null},
    "trades": [{"type": "LONG", "entry_date": "2023-01-03T00:00:00", "entry_price": 125.07,
                "exit_date": "2023-01-05T00:00:00", "exit_price": 125.02, "return": -0.0004}],
    "equity_png": null,
    "price_png": null
}"#;

pub fn run_result() -> BacktestResult {
    serde_json::from_str(RUN_BODY).unwrap()
}

/// A canned-response `BacktestApi` that records what it was asked.
pub struct MockApi {
    responses: Mutex<VecDeque<Result<BacktestResult, ApiError>>>,
    pub requests: Mutex<Vec<BacktestRequest>>,
    delay: Duration,
}

impl MockApi {
    pub fn new(responses: Vec<Result<BacktestResult, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl BacktestApi for MockApi {
    async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestResult, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no canned response".into())))
    }

    async fn list_strategies(&self) -> Result<Vec<StrategyInfo>, ApiError> {
        Ok(Vec::new())
    }

    async fn list_tickers(&self) -> Result<Vec<TickerInfo>, ApiError> {
        Ok(Vec::new())
    }
}

/// Raw request captured by the stub server.
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

/// Serve exactly one HTTP response on a local port. Returns the base URL
/// and a handle yielding the request that was received.
pub async fn serve_once(status: u16, reason: &str, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        captured
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = (header_end + content_length).min(buf.len());
    CapturedRequest {
        head,
        body: String::from_utf8_lossy(&buf[header_end..body_end]).to_string(),
    }
}

/// A base URL nothing is listening on.
pub async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
