//! Error types for platform operations.

use std::path::PathBuf;

use socext_core::UnknownConnection;

/// Errors that can occur during platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// A connection name and index is declared twice.
    #[error("duplicate connection: {name}:{index}")]
    DuplicateConnection {
        /// The colliding connection name.
        name: String,
        /// The colliding instance index.
        index: usize,
    },

    /// Lookup of an undeclared connection.
    #[error(transparent)]
    UnknownConnection(#[from] UnknownConnection),

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading/writing platform files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Platform file not found.
    #[error("platform file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
