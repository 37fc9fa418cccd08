use thiserror::Error;

/// Failures reported by the browser-control collaborator
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Raised only by interactions (click, type); lookups report absence as `None`
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Interaction failed: {0}")]
    InteractionFailed(String),

    #[error("Failed to read page content: {0}")]
    ContentFailed(String),
}

/// Reasons a single candidate was skipped; never fatal to the run
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("no usable detail reference on candidate")]
    ReferenceMissing,

    #[error("detail reference '{reference}' cannot be resolved: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("detail page {url} never became ready")]
    OpenFailed { url: String },

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Failures writing the result file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write output file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures loading an options file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A date criterion that is not a valid DD/MM/YYYY calendar date
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed date '{input}' (expected DD/MM/YYYY)")]
pub struct MalformedDate {
    pub input: String,
}

/// Result alias for browser-control operations
pub type Result<T> = std::result::Result<T, BrowserError>;
