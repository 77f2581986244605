//! Application state for the publication API.

use std::sync::Arc;

use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the run configuration every request is built against.
#[derive(Clone)]
pub struct AppState {
    /// The loaded run configuration.
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // axum state must be Clone
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_state_shares_configuration() {
        let state = AppState::new(ConfigLoader::load("./config").unwrap());
        let cloned = state.clone();
        assert_eq!(state.config().month_date(), cloned.config().month_date());
    }
}
