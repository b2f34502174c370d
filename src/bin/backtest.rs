use anyhow::{bail, Context, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use quant_backtester::client::HttpBacktestClient;
use quant_backtester::config::Config;
use quant_backtester::models::BacktestRequest;
use quant_backtester::state::configuration::{parse_date, parse_number, parse_strategy};
use quant_backtester::state::{AppState, CancelToken, RunOutcome};
use quant_backtester::view::ReportRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // backtest [TICKER] [STRATEGY] [START] [END] [key=value ...]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut app = AppState::new(&cfg);

    let mut positional = args.iter().filter(|a| !a.contains('='));
    if let Some(ticker) = positional.next() {
        app.config.set_ticker(ticker.as_str());
    }
    if let Some(strategy) = positional.next() {
        app.config.set_strategy(parse_strategy(strategy)?);
    }
    match (positional.next(), positional.next()) {
        (Some(start), Some(end)) => app.config.set_period(parse_date(start)?, parse_date(end)?),
        (Some(start), None) => {
            let end = app.config.period.end;
            app.config.set_period(parse_date(start)?, end);
        }
        _ => {}
    }
    for kv in args.iter().filter(|a| a.contains('=')) {
        let (key, value) = kv.split_once('=').context("expected key=value")?;
        app.config.set_param_named(key, parse_number(value)?)?;
    }

    let request = app.build_request();
    println!("{}", "=".repeat(70));
    println!("  Service:   {}", cfg.api_base_url);
    println!("  Request:   {}", serde_json::to_string(&request)?);
    println!("{}", "=".repeat(70));

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let client = HttpBacktestClient::new(&cfg);
    match app.results.run(&client, &request, &cancel).await? {
        RunOutcome::Applied => {}
        RunOutcome::Failed(message) => bail!("Backtest failed: {}", message),
        RunOutcome::Discarded => {
            warn!("Interrupted before the service answered");
            return Ok(());
        }
    }

    let view = app.view();
    let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    print!("{}", ReportRenderer::new(&app.theme, color).render(Some(&request), &view));

    let path = report_path(&cfg, &request);
    std::fs::create_dir_all(&cfg.report_dir)
        .with_context(|| format!("creating {}", cfg.report_dir))?;
    std::fs::write(&path, ReportRenderer::plain().render(Some(&request), &view))
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Report saved to: {}", path.display());

    Ok(())
}

fn report_path(cfg: &Config, request: &BacktestRequest) -> PathBuf {
    PathBuf::from(&cfg.report_dir).join(format!(
        "backtest_{}_{}_{}_{}.txt",
        request.ticker.replace(['/', '\\'], "-"),
        request.strategy,
        request.period.start.format("%Y%m%d"),
        request.period.end.format("%Y%m%d"),
    ))
}
