use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use quant_backtester::client::{ApiError, BacktestApi};
use quant_backtester::config::Config;
use quant_backtester::models::{BacktestRequest, BacktestResult, ParamKey};
use quant_backtester::state::configuration::{
    parse_date, parse_number, parse_strategy, PRESET_TICKERS,
};
use quant_backtester::state::{
    Action, AppState, CancelToken, ConfigAction, ConfigError, RunOutcome, RunTicket,
};
use quant_backtester::view::ReportRenderer;

/// A finished request, handed back to the session loop.
struct Completion {
    ticket: RunTicket,
    outcome: Result<BacktestResult, ApiError>,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Edit(Action),
    Show,
    Run,
    Cancel,
    Strategies,
    Tickers,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, ConfigError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = parts.split_first() else {
        return Ok(None);
    };

    let edit = |a: ConfigAction| -> Result<Option<Command>, ConfigError> {
        Ok(Some(Command::Edit(Action::Config(a))))
    };

    match (head.to_lowercase().as_str(), args) {
        ("ticker", [symbol]) => edit(ConfigAction::SetTicker(symbol.to_string())),
        ("strategy", [name]) => edit(ConfigAction::SetStrategy(parse_strategy(name)?)),
        ("param", [key, value]) => {
            let key = ParamKey::from_str_loose(key).ok_or_else(|| ConfigError::UnknownParam(key.to_string()))?;
            edit(ConfigAction::SetParam(key, parse_number(value)?))
        }
        ("period", [start, end]) => edit(ConfigAction::SetPeriod(parse_date(start)?, parse_date(end)?)),
        ("theme", []) => Ok(Some(Command::Edit(Action::ToggleTheme))),
        ("show", []) => Ok(Some(Command::Show)),
        ("run", []) => Ok(Some(Command::Run)),
        ("cancel", []) => Ok(Some(Command::Cancel)),
        ("strategies", []) => Ok(Some(Command::Strategies)),
        ("tickers", []) => Ok(Some(Command::Tickers)),
        ("help", _) | ("?", _) => Ok(Some(Command::Help)),
        ("quit", []) | ("exit", []) => Ok(Some(Command::Quit)),
        _ => Ok(Some(Command::Help)),
    }
}

pub struct Session {
    app: AppState,
    api: Arc<dyn BacktestApi>,
    cancel: CancelToken,
    color: bool,
    pending_request: Option<BacktestRequest>,
    last_request: Option<BacktestRequest>,
    running: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Session {
    pub fn new(cfg: &Config, api: Arc<dyn BacktestApi>, color: bool) -> Self {
        info!("{}", "=".repeat(60));
        info!("Backtest client starting up");
        info!("Service: {}", cfg.api_base_url);
        info!("Theme: {}", cfg.theme);
        info!("{}", "=".repeat(60));

        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            app: AppState::new(cfg),
            api,
            cancel: CancelToken::new(),
            color,
            pending_request: None,
            last_request: None,
            running: None,
            tx,
            rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        print_help();
        self.print_config();
        self.prompt();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    self.shutdown();
                    return Ok(());
                }
                Some(done) = self.rx.recv() => {
                    self.on_complete(done);
                    self.prompt();
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if !self.handle_line(&line).await {
                                self.shutdown();
                                return Ok(());
                            }
                            self.prompt();
                        }
                        None => {
                            self.shutdown();
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Returns `false` when the session should end.
    async fn handle_line(&mut self, line: &str) -> bool {
        let command = match parse_command(line) {
            Ok(Some(c)) => c,
            Ok(None) => return true,
            Err(e) => {
                println!("  {}", e);
                return true;
            }
        };
        debug!("command {:?}", command);

        match command {
            Command::Edit(action) => {
                if let Err(e) = self.app.dispatch(action) {
                    println!("  {}", e);
                } else {
                    self.print_config();
                }
            }
            Command::Show => {
                self.print_config();
                self.print_report();
            }
            Command::Run => self.start_run(),
            Command::Cancel => {
                if self.cancel_run() {
                    println!("  Cancelled");
                } else {
                    println!("  Nothing to cancel");
                }
            }
            Command::Strategies => match self.api.list_strategies().await {
                Ok(list) => {
                    for s in list {
                        println!("  {:<16} {}", s.name, s.description);
                        for (name, desc) in &s.params {
                            println!("      {:<8} {}", name, desc);
                        }
                    }
                }
                Err(e) => println!("  Error: {}", e.user_message()),
            },
            Command::Tickers => match self.api.list_tickers().await {
                Ok(list) => {
                    for t in list {
                        println!("  {:<8} {:<6} {}", t.symbol, t.kind, t.description);
                    }
                }
                Err(e) => {
                    warn!("Ticker list unavailable: {}", e);
                    println!("  Presets: {}", PRESET_TICKERS.join(", "));
                }
            },
            Command::Help => print_help(),
            Command::Quit => return false,
        }
        true
    }

    fn start_run(&mut self) {
        let request = self.app.build_request();
        let ticket = match self.app.results.begin() {
            Ok(t) => t,
            Err(e) => {
                println!("  {}", e);
                return;
            }
        };

        info!(
            "Run #{}: {} {} ({}) {}..{}",
            ticket.id(),
            request.ticker,
            request.strategy,
            request.params,
            request.period.start,
            request.period.end
        );
        println!("  Running...");

        self.pending_request = Some(request.clone());
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();

        self.running = Some(tokio::spawn(async move {
            tokio::select! {
                outcome = api.run_backtest(&request) => {
                    // receiver gone means the session already ended
                    let _ = tx.send(Completion { ticket, outcome });
                }
                _ = cancel.cancelled() => {
                    debug!("Run #{} abandoned at shutdown", ticket.id());
                }
            }
        }));
    }

    /// Abort the request task and drop the in-flight run.
    fn cancel_run(&mut self) -> bool {
        if let Some(task) = self.running.take() {
            task.abort();
        }
        let cancelled = self.app.results.cancel();
        if cancelled {
            self.pending_request = None;
        }
        cancelled
    }

    fn on_complete(&mut self, done: Completion) {
        match self.app.results.complete(done.ticket, done.outcome) {
            RunOutcome::Applied => {
                self.running = None;
                self.last_request = self.pending_request.take();
                self.print_report();
            }
            RunOutcome::Failed(message) => {
                self.running = None;
                self.pending_request = None;
                println!("  Error: {}", message);
                if !self.app.results.result().is_empty() {
                    println!("  (showing previous results; `show` to redisplay)");
                }
            }
            RunOutcome::Discarded => {}
        }
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        if self.cancel_run() {
            info!("Dropped in-flight run on exit");
        }
        info!("Session closed");
    }

    fn print_config(&self) {
        let cfg = &self.app.config;
        println!("  Ticker:   {}", cfg.ticker);
        println!("  Strategy: {} ({})", cfg.strategy.label(), cfg.strategy);
        for key in cfg.strategy.param_keys() {
            let hint = key
                .input_hint_min()
                .map(|min| format!("  (min={})", min))
                .unwrap_or_default();
            println!("    {:<8} {}{}", key.label(), cfg.params.get(*key), hint);
        }
        println!("  Period:   {} to {}", cfg.period.start, cfg.period.end);
        println!("  Theme:    {}", self.app.theme.mode());
        for advisory in cfg.advisories() {
            println!("  note: {}", advisory);
        }
        if self.app.results.loading() {
            println!("  Status:   running");
        }
        if let Some(error) = self.app.results.error() {
            println!("  Error:    {}", error);
        }
    }

    fn print_report(&self) {
        let renderer = ReportRenderer::new(&self.app.theme, self.color);
        print!("{}", renderer.render(self.last_request.as_ref(), &self.app.view()));
    }

    fn prompt(&self) {
        let marker = if self.app.results.loading() { "*" } else { "" };
        print!("{}{}> ", self.app.config.ticker, marker);
        let _ = std::io::stdout().flush();
    }
}

fn print_help() {
    println!("Commands:");
    println!("  ticker <SYMBOL>            e.g. {}", PRESET_TICKERS.join(", "));
    println!("  strategy <name>            ma_crossover | mean_reversion | breakout");
    println!("  param <key> <value>        fast, slow, window, std_k");
    println!("  period <start> <end>       YYYY-MM-DD YYYY-MM-DD");
    println!("  run | cancel | show        start, abandon, or redisplay a backtest");
    println!("  theme                      toggle light/dark");
    println!("  strategies | tickers       list what the service offers");
    println!("  help | quit");
}
