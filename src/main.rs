mod session;

use anyhow::Result;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use quant_backtester::config::Config;
use quant_backtester::client::HttpBacktestClient;

use crate::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let api = Arc::new(HttpBacktestClient::new(&cfg));

    let mut session = Session::new(&cfg, api, color);
    session.run().await?;

    Ok(())
}
