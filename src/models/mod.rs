pub mod request;
pub mod result;
pub mod strategy;

pub use request::{BacktestRequest, Period};
pub use result::{BacktestResult, ErrorBody, Metrics, Trade};
pub use strategy::*;
