//! SoC error types.

use socext_core::PeripheralError;
use socext_platform::PlatformError;

/// Errors that can occur while building or composing a SoC.
#[derive(Debug, thiserror::Error)]
pub enum SocError {
    /// A submodule key is already taken.
    #[error("duplicate submodule key: {key}")]
    DuplicateKey { key: String },

    /// No submodule registered under this key.
    #[error("unknown submodule: {key}")]
    UnknownSubmodule { key: String },

    /// The submodule exposes no registers.
    #[error("submodule '{key}' is not a register bank")]
    NotARegisterBank { key: String },

    /// The CSR region is already mapped.
    #[error("CSR region '{key}' already added")]
    DuplicateCsrRegion { key: String },

    /// No factory bound to this name.
    #[error("unknown factory: {name}")]
    UnknownFactory { name: String },

    /// The factory name was already rebound once.
    #[error("factory '{name}' already installed")]
    FactoryAlreadyInstalled { name: String },

    /// A CSR region's registers overrun its page.
    #[error("CSR region '{region}' needs 0x{size:X} bytes but csr-paging is 0x{paging:X}")]
    CsrRegionOverflow {
        region: String,
        size: u64,
        paging: u64,
    },

    /// A CSR address does not fit in 64 bits.
    #[error("CSR region '{region}' lies beyond the 64-bit address space")]
    CsrAddressOverflow { region: String },

    /// Invalid SoC options.
    #[error("invalid options: {detail}")]
    InvalidOptions { detail: String },

    /// Platform error (unknown or duplicate connection, file errors).
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Peripheral construction error.
    #[error(transparent)]
    Peripheral(#[from] PeripheralError),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for SoC operations.
pub type Result<T> = std::result::Result<T, SocError>;
