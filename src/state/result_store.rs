use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{ApiError, BacktestApi};
use crate::models::{BacktestRequest, BacktestResult};
use crate::state::cancel::CancelToken;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("a backtest is already running")]
    AlreadyRunning,
}

/// Identifies one in-flight run. Completions carrying any other ticket
/// are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket(u64);

impl RunTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The result was replaced.
    Applied,
    /// The run failed; the message is now in `error`.
    Failed(String),
    /// The response arrived for a cancelled or superseded run and was dropped.
    Discarded,
}

/// Loading/error flags plus the last successful result.
///
/// The result is an immutable snapshot; a successful run swaps in a new
/// one, a failed run leaves the old one in place.
#[derive(Debug, Default)]
pub struct ResultStore {
    loading: bool,
    error: Option<String>,
    result: Arc<BacktestResult>,
    in_flight: Option<RunTicket>,
    next_ticket: u64,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current snapshot. Cheap to clone and never partially updated.
    pub fn result(&self) -> Arc<BacktestResult> {
        Arc::clone(&self.result)
    }

    pub fn in_flight(&self) -> Option<RunTicket> {
        self.in_flight
    }

    /// Start a run: `loading = true`, `error = None`.
    ///
    /// Rejected while another run is outstanding; the flags are left as they are.
    pub fn begin(&mut self) -> Result<RunTicket, RunError> {
        if self.in_flight.is_some() {
            return Err(RunError::AlreadyRunning);
        }
        self.next_ticket += 1;
        let ticket = RunTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        self.loading = true;
        self.error = None;
        debug!("Run #{} started", ticket.0);
        Ok(ticket)
    }

    /// Apply the response of the run identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: RunTicket,
        outcome: Result<BacktestResult, ApiError>,
    ) -> RunOutcome {
        if self.in_flight != Some(ticket) {
            debug!("Discarding late response for run #{}", ticket.0);
            return RunOutcome::Discarded;
        }
        self.in_flight = None;
        self.loading = false;

        match outcome {
            Ok(result) => {
                info!(
                    "Run #{} complete: {} bars, {} trades",
                    ticket.0,
                    result.equity.len(),
                    result.trades.len()
                );
                self.result = Arc::new(result);
                RunOutcome::Applied
            }
            Err(e) => {
                warn!("Run #{} failed: {}", ticket.0, e);
                let message = e.user_message();
                self.error = Some(message.clone());
                RunOutcome::Failed(message)
            }
        }
    }

    /// Abandon the in-flight run, if any. Its response will be discarded.
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(ticket) => {
                info!("Run #{} cancelled", ticket.0);
                self.loading = false;
                true
            }
            None => false,
        }
    }

    /// Issue `request` and apply its response, unless `cancel` fires first.
    pub async fn run(
        &mut self,
        api: &dyn BacktestApi,
        request: &BacktestRequest,
        cancel: &CancelToken,
    ) -> Result<RunOutcome, RunError> {
        if cancel.is_cancelled() {
            return Ok(RunOutcome::Discarded);
        }
        let ticket = self.begin()?;

        let outcome = tokio::select! {
            outcome = api.run_backtest(request) => Some(outcome),
            _ = cancel.cancelled() => None,
        };

        Ok(match outcome {
            Some(outcome) => self.complete(ticket, outcome),
            None => {
                self.cancel();
                RunOutcome::Discarded
            }
        })
    }
}
