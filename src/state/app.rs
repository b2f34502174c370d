use tracing::{debug, warn};

use crate::config::Config;
use crate::models::BacktestRequest;
use crate::state::configuration::{ConfigAction, ConfigError, ConfigurationState};
use crate::state::request_builder::RequestBuilder;
use crate::state::result_store::ResultStore;
use crate::theme::{ThemeContext, ThemeMode};
use crate::view::ViewModel;

/// Edits the session reacts to without touching the network.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Config(ConfigAction),
    ToggleTheme,
}

impl From<ConfigAction> for Action {
    fn from(a: ConfigAction) -> Self {
        Action::Config(a)
    }
}

/// Everything one session owns. There is exactly one of these per
/// session and all mutation goes through it.
#[derive(Debug)]
pub struct AppState {
    pub config: ConfigurationState,
    pub results: ResultStore,
    pub theme: ThemeContext,
}

impl AppState {
    pub fn new(cfg: &Config) -> Self {
        Self {
            config: ConfigurationState::new(cfg),
            results: ResultStore::new(),
            theme: ThemeContext::new(cfg.theme),
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Result<(), ConfigError> {
        debug!("dispatch {:?}", action);
        match action {
            Action::Config(a) => self.config.apply(a),
            Action::ToggleTheme => {
                let mode: ThemeMode = self.theme.toggle();
                debug!("theme -> {} ({})", mode, self.theme.root_class());
                Ok(())
            }
        }
    }

    /// Request for the current configuration, logging any advisories.
    pub fn build_request(&self) -> BacktestRequest {
        for advisory in self.config.advisories() {
            warn!("Sending anyway: {}", advisory);
        }
        RequestBuilder::build(&self.config)
    }

    pub fn view(&self) -> ViewModel {
        ViewModel::from_result(&self.results.result())
    }
}
