use thiserror::Error;

/// Core error types for Tasktrack operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid task ID: {0}")]
    InvalidId(String),

    #[error("Invalid date: {0}")]
    InvalidDateTime(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidId error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    /// Create a new InvalidDateTime error
    pub fn invalid_date_time(value: impl Into<String>) -> Self {
        Self::InvalidDateTime(value.into())
    }

    /// Create a new InvalidStatus error
    pub fn invalid_status(value: impl Into<String>) -> Self {
        Self::InvalidStatus(value.into())
    }

    /// Create a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidId(_)
                | Self::InvalidDateTime(_)
                | Self::InvalidStatus(_)
                | Self::Validation { .. }
        )
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
