//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote API rejected or failed an operation
    #[error("Remote operation {operation} failed: {message}")]
    Remote { operation: String, message: String },

    /// A response or record did not have the expected shape
    #[error("Unexpected response from {operation}: {message}")]
    Decode { operation: String, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Remote error for a named operation.
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a Decode error for a named operation.
    pub fn decode(operation: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Decode {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) => 2,
            MigrateError::Remote { .. } | MigrateError::Http(_) => 3,
            MigrateError::Decode { .. } | MigrateError::Json(_) => 4,
            MigrateError::Io(_) => 5,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
