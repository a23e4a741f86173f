use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Crate-wide error taxonomy.
///
/// `Transport` is the only automatically retryable variant: the remote
/// service could not be reached at all, so the queued entry stays in the
/// mutation log. Definitive rejections from the server are not errors at
/// this level — they travel as `WriteOutcome::Rejected` because they are
/// expected outcomes the operator has to resolve.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Authentication required: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the failure warrants keeping the entry queued and
    /// retrying on the next drain trigger.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transport(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            AppError::Configuration(err.to_string())
        } else {
            // Timeouts, connect errors, aborted bodies: no usable server
            // response, so the request may be replayed.
            AppError::Transport(err.to_string())
        }
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}
