//! Error types for the ps-app service layer.

/// Application error type that wraps errors from the backend crates
/// and gives the CLI a single error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Out-of-domain configuration detected before a run starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Project error: {0}")]
    Project(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ps-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ps_project::ProjectError> for AppError {
    fn from(err: ps_project::ProjectError) -> Self {
        match err {
            ps_project::ProjectError::Validation(e) => AppError::Configuration(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<ps_project::ValidationError> for AppError {
    fn from(err: ps_project::ValidationError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl From<ps_sim::SimError> for AppError {
    fn from(err: ps_sim::SimError) -> Self {
        match err {
            ps_sim::SimError::Cancelled { .. } => AppError::Cancelled,
            other => AppError::Configuration(other.to_string()),
        }
    }
}

impl From<ps_controls::ControlError> for AppError {
    fn from(err: ps_controls::ControlError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl From<ps_results::ResultsError> for AppError {
    fn from(err: ps_results::ResultsError) -> Self {
        match err {
            ps_results::ResultsError::FrameOutOfRange { .. } => {
                AppError::InvalidInput(err.to_string())
            }
            other => AppError::Results(other.to_string()),
        }
    }
}
