use thiserror::Error;

/// Errors produced by postgrab operations
#[derive(Error, Debug)]
pub enum GrabError {
    #[error("failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("failed to capture post snapshot: {0}")]
    SnapshotFailed(String),

    #[error("script evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("download backend '{backend}' failed: {reason}")]
    BackendFailed { backend: String, reason: String },

    #[error("every download attempt failed for '{filename}'")]
    DownloadExhausted { filename: String },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GrabError>;
