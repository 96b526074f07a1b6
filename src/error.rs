use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to acquire image: {0}")]
    Acquisition(String),
    #[error("{0}")]
    Analysis(String),
    #[error("{0}")]
    Search(String),
    #[error("{0}")]
    Save(String),
    #[error("Catalog request failed: {0}")]
    Catalog(String),
    #[error("A {0} request is already in flight.")]
    Busy(&'static str),
    #[error("No image has been selected.")]
    MissingImage,
    #[error("Cannot {action} while {phase}.")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
    #[error("Threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}
