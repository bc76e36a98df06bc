use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load catalog from {path}: {message}")]
    CatalogLoadError { path: String, message: String },

    #[error("Backend unavailable at {endpoint}: {message}")]
    UpstreamUnavailable { endpoint: String, message: String },

    #[error("Scan pipeline error: {message}")]
    ProcessingError { message: String },

    #[error("Cannot start a scan while {state}")]
    InvalidTransition { state: String },

    #[error("Cart error: {message}")]
    CartError { message: String },
}

impl ScanError {
    pub fn upstream(endpoint: impl Into<String>, message: impl ToString) -> Self {
        ScanError::UpstreamUnavailable {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScanError::UpstreamUnavailable { .. } => {
                "The price backend is not responding.".to_string()
            }
            ScanError::IoError(e) => format!("A file could not be read or written: {}", e),
            ScanError::ConfigError { .. }
            | ScanError::ConfigValidationError { .. }
            | ScanError::InvalidConfigValueError { .. } => format!("Invalid configuration: {}", self),
            ScanError::CatalogLoadError { path, .. } => {
                format!("The catalog file '{}' could not be loaded.", path)
            }
            ScanError::ProcessingError { .. } => "The scan could not be completed.".to_string(),
            ScanError::InvalidTransition { state } => {
                format!("A scan cannot be started while {}.", state)
            }
            ScanError::CartError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScanError::UpstreamUnavailable { .. } => {
                "Check that the backend is running and the base URL/port is correct, then retry"
            }
            ScanError::IoError(_) | ScanError::CatalogLoadError { .. } => {
                "Check that the file exists and is readable"
            }
            ScanError::ConfigError { .. }
            | ScanError::ConfigValidationError { .. }
            | ScanError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line flags"
            }
            ScanError::ProcessingError { .. } => {
                "Check the [[scan.stages]] list: it must end with exactly one extract stage"
            }
            ScanError::InvalidTransition { .. } => "Wait for the current scan or reset first",
            ScanError::CartError { .. } => "Pick a product that has at least one price",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
