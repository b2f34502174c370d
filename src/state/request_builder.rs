use crate::models::request::{BAR_INTERVAL, DATA_SOURCE, INITIAL_CAPITAL};
use crate::models::{BacktestRequest, Strategy, StrategyParams};
use crate::state::configuration::{ConfigurationState, ParamValues};

/// Maps configuration to the request payload.
pub struct RequestBuilder;

impl RequestBuilder {
    pub fn build(config: &ConfigurationState) -> BacktestRequest {
        BacktestRequest {
            ticker: config.ticker.clone(),
            strategy: config.strategy,
            params: Self::params_for(config.strategy, &config.params),
            period: config.period,
            source: DATA_SOURCE.to_string(),
            interval: BAR_INTERVAL.to_string(),
            initial_capital: INITIAL_CAPITAL,
        }
    }

    /// Select the inputs `strategy` uses.
    pub fn params_for(strategy: Strategy, values: &ParamValues) -> StrategyParams {
        match strategy {
            Strategy::MaCrossover => StrategyParams::MaCrossover {
                fast: values.fast,
                slow: values.slow,
            },
            Strategy::MeanReversion => StrategyParams::MeanReversion {
                window: values.window,
                std_k: values.std_k,
            },
            Strategy::Breakout => StrategyParams::Breakout {
                window: values.window,
            },
        }
    }
}
