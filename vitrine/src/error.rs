use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

use crate::config::ConfigError;

/// Error type for vitrine
#[derive(Debug, Error)]
pub enum VitrineError {
    /// The configuration could not be read
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The configured log level is no valid filter directive
    #[error("Invalid log level: {0}")]
    LogLevel(#[from] ParseError),

    /// A global `tracing` subscriber was installed already
    #[error("{0}")]
    Tracing(#[from] TryInitError),
}
