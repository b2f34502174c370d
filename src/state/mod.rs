pub mod app;
pub mod cancel;
pub mod configuration;
pub mod request_builder;
pub mod result_store;

pub use app::{Action, AppState};
pub use cancel::CancelToken;
pub use configuration::{Advisory, ConfigAction, ConfigError, ConfigurationState, ParamValues};
pub use request_builder::RequestBuilder;
pub use result_store::{ResultStore, RunError, RunOutcome, RunTicket};
