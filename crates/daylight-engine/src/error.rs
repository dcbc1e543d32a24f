//! Error types for the Daylight engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the cycle run.

/// Top-level error for the Daylight engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: daylight_core::config::ConfigError,
    },

    /// Connecting to or talking with the simulator failed outside the loop.
    #[error("simulator error: {source}")]
    Simulator {
        /// The underlying simulator error.
        #[from]
        source: daylight_core::SimulatorError,
    },

    /// The cycle loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: daylight_core::runner::RunnerError,
    },
}
