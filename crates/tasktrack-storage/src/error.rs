//! Storage error types for the storage abstraction layer.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("Record not found: {collection}/{id}")]
    NotFound {
        /// The collection the record was looked up in.
        collection: String,
        /// The ID of the record that was not found.
        id: String,
    },

    /// Attempted to create a record that violates a uniqueness constraint.
    #[error("Record already exists: {collection}/{key}")]
    AlreadyExists {
        /// The collection the conflict occurred in.
        collection: String,
        /// The conflicting key (id or unique field value).
        key: String,
    },

    /// The record data could not be (de)serialized for storage.
    #[error("Invalid document: {message}")]
    InvalidDocument {
        /// Description of why the document is invalid.
        message: String,
    },

    /// Failed to connect to the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Creates a new `InvalidDocument` error.
    #[must_use]
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
