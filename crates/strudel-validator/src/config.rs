//! Compiled-in worker configuration.
//!
//! The worker takes no flags and reads no environment variables: the parent
//! process owns its lifecycle, so every setting here is a fixed default.

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings for the worker's ambient services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Config {
    /// Returns the tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }
}
