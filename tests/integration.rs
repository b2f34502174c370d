mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use common::{run_result, MockApi};
use quant_backtester::client::ApiError;
use quant_backtester::config::Config;
use quant_backtester::models::{ParamKey, Strategy};
use quant_backtester::state::{
    Action, AppState, CancelToken, ConfigAction, ResultStore, RunError, RunOutcome,
};
use quant_backtester::view::{Classification, ReportRenderer, ViewModel};

fn app() -> AppState {
    AppState::new(&Config::default())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Run lifecycle
// ============================================================================

#[tokio::test]
async fn successful_run_replaces_result() {
    let api = MockApi::new(vec![Ok(run_result())]);
    let mut app = app();
    let request = app.build_request();

    let outcome = app.results.run(&api, &request, &CancelToken::new()).await.unwrap();

    assert_eq!(outcome, RunOutcome::Applied);
    assert!(!app.results.loading());
    assert!(app.results.error().is_none());
    assert_eq!(app.results.result().equity.len(), 4);
    assert_eq!(api.request_count(), 1);
    assert_eq!(api.requests.lock().unwrap()[0], request);
}

#[tokio::test]
async fn failed_run_keeps_previous_result() {
    let api = MockApi::new(vec![
        Ok(run_result()),
        Err(ApiError::Status {
            status: 400,
            detail: Some("Unknown ticker".into()),
        }),
    ]);
    let mut app = app();
    let request = app.build_request();
    let cancel = CancelToken::new();

    app.results.run(&api, &request, &cancel).await.unwrap();
    let before = app.results.result();

    let outcome = app.results.run(&api, &request, &cancel).await.unwrap();

    assert_eq!(outcome, RunOutcome::Failed("Unknown ticker".into()));
    assert!(!app.results.loading());
    assert_eq!(app.results.error(), Some("Unknown ticker"));
    assert!(Arc::ptr_eq(&before, &app.results.result()));
}

#[tokio::test]
async fn error_clears_on_next_run() {
    let api = MockApi::new(vec![
        Err(ApiError::Transport("connection refused".into())),
        Ok(run_result()),
    ]);
    let mut app = app();
    let request = app.build_request();
    let cancel = CancelToken::new();

    app.results.run(&api, &request, &cancel).await.unwrap();
    assert_eq!(app.results.error(), Some("Request failed"));
    assert!(app.results.result().is_empty());

    app.results.run(&api, &request, &cancel).await.unwrap();
    assert!(app.results.error().is_none());
    assert!(!app.results.result().is_empty());
}

#[tokio::test]
async fn second_begin_is_rejected_while_running() {
    let mut store = ResultStore::new();
    let first = store.begin().unwrap();

    assert_eq!(store.begin(), Err(RunError::AlreadyRunning));
    assert!(store.loading());

    assert_eq!(store.complete(first, Ok(run_result())), RunOutcome::Applied);
    assert!(store.begin().is_ok());
}

#[tokio::test]
async fn cancelled_run_discards_late_response() {
    let mut store = ResultStore::new();
    let ticket = store.begin().unwrap();
    assert!(store.cancel());
    assert!(!store.loading());

    assert_eq!(store.complete(ticket, Ok(run_result())), RunOutcome::Discarded);
    assert!(store.result().is_empty());
    assert!(store.error().is_none());
}

#[tokio::test]
async fn cancel_token_interrupts_slow_request() {
    let api = MockApi::new(vec![Ok(run_result())]).with_delay(Duration::from_secs(30));
    let mut store = ResultStore::new();
    let request = app().build_request();
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let outcome = store.run(&api, &request, &cancel).await.unwrap();

    assert_eq!(outcome, RunOutcome::Discarded);
    assert!(!store.loading());
    assert!(store.in_flight().is_none());
    assert!(store.result().is_empty());
}

#[tokio::test]
async fn already_cancelled_token_skips_the_call() {
    let api = MockApi::new(vec![Ok(run_result())]);
    let mut store = ResultStore::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let outcome = store.run(&api, &app().build_request(), &cancel).await.unwrap();

    assert_eq!(outcome, RunOutcome::Discarded);
    assert_eq!(api.request_count(), 0);
}

// ============================================================================
// Configuration to request
// ============================================================================

#[tokio::test]
async fn edits_flow_into_the_request() {
    let api = MockApi::new(vec![Ok(run_result())]);
    let mut app = app();

    app.dispatch(ConfigAction::SetTicker("  msft ".into()).into()).unwrap();
    app.dispatch(ConfigAction::SetStrategy(Strategy::MeanReversion).into()).unwrap();
    app.dispatch(ConfigAction::SetParam(ParamKey::Window, 30.0).into()).unwrap();
    app.dispatch(ConfigAction::SetParam(ParamKey::StdK, 1.5).into()).unwrap();
    app.dispatch(ConfigAction::SetPeriod(date(2021, 1, 1), date(2022, 1, 1)).into())
        .unwrap();

    let request = app.build_request();
    app.results.run(&api, &request, &CancelToken::new()).await.unwrap();

    let sent = serde_json::to_value(&api.requests.lock().unwrap()[0]).unwrap();
    assert_eq!(sent["ticker"], "msft");
    assert_eq!(sent["strategy"], "mean_reversion");
    assert_eq!(sent["params"], serde_json::json!({"window": 30, "std_k": 1.5}));
    assert_eq!(
        sent["period"],
        serde_json::json!({"start": "2021-01-01", "end": "2022-01-01"})
    );
    assert_eq!(sent["source"], "yfinance");
    assert_eq!(sent["interval"], "1d");
}

#[test]
fn switching_strategy_keeps_hidden_params() {
    let mut app = app();
    app.dispatch(ConfigAction::SetParam(ParamKey::Fast, 7.0).into()).unwrap();
    app.dispatch(ConfigAction::SetStrategy(Strategy::Breakout).into()).unwrap();

    let sent = serde_json::to_value(app.build_request()).unwrap();
    assert_eq!(sent["params"], serde_json::json!({"window": 20}));

    app.dispatch(ConfigAction::SetStrategy(Strategy::MaCrossover).into()).unwrap();
    let sent = serde_json::to_value(app.build_request()).unwrap();
    assert_eq!(sent["params"], serde_json::json!({"fast": 7, "slow": 50}));
}

#[test]
fn questionable_config_is_still_sent() {
    let mut app = app();
    app.dispatch(ConfigAction::SetParam(ParamKey::Fast, 80.0).into()).unwrap();
    app.dispatch(ConfigAction::SetPeriod(date(2024, 1, 1), date(2023, 1, 1)).into())
        .unwrap();

    assert_eq!(app.config.advisories().len(), 2);
    let request = app.build_request();
    assert_eq!(request.period.start, date(2024, 1, 1));
}

#[test]
fn theme_toggle_is_independent_of_results() {
    let mut app = app();
    let before = app.results.result();
    app.dispatch(Action::ToggleTheme).unwrap();
    assert_eq!(app.theme.root_class(), "theme-dark");
    app.dispatch(Action::ToggleTheme).unwrap();
    assert_eq!(app.theme.root_class(), "theme-light");
    assert!(Arc::ptr_eq(&before, &app.results.result()));
}

// ============================================================================
// View
// ============================================================================

#[tokio::test]
async fn view_reflects_applied_result() {
    let api = MockApi::new(vec![Ok(run_result())]);
    let mut app = app();
    assert!(app.view().is_empty());

    let request = app.build_request();
    app.results.run(&api, &request, &CancelToken::new()).await.unwrap();
    let view = app.view();

    assert_eq!(view.equity.len(), 4);
    assert_eq!(view.overlay.buys.len(), 2);
    assert_eq!(view.overlay.sells.len(), 1);

    let rows = view.metrics.as_ref().unwrap();
    let win = rows.iter().find(|r| r.key == "win_rate").unwrap();
    assert_eq!(win.display, "50.00%");
    let pf = rows.iter().find(|r| r.key == "profit_factor").unwrap();
    assert_eq!(pf.display, "—");
    assert_eq!(pf.class, Classification::Neutral);

    assert_eq!(view.trades[0].ret, "-0.04%");
    assert_eq!(view.trades[0].ret_class, Classification::Negative);

    let text = ReportRenderer::plain().render(Some(&request), &view);
    assert!(text.contains("AAPL"));
    assert!(text.contains("Buys:        2   Sells: 1"));
}

#[test]
fn view_is_a_pure_projection() {
    let result = run_result();
    assert_eq!(ViewModel::from_result(&result), ViewModel::from_result(&result));
    assert_eq!(result, run_result());
}
