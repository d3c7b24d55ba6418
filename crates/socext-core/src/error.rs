//! Error types for peripheral construction.

use crate::signal::UnknownConnection;

/// Errors that can occur while building a peripheral.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeripheralError {
    /// A status register needs at least one signal.
    #[error("peripheral declares no signals")]
    NoSignals,

    /// Two signals share a name (names are case-sensitive).
    #[error("duplicate signal name: {name}")]
    DuplicateSignal {
        /// The repeated name.
        name: String,
    },

    /// The register would not fit in a single CSR.
    #[error("register '{register}' is {width} bits wide (maximum {max})")]
    TooWide {
        /// Register name.
        register: String,
        /// Requested width in bits.
        width: u32,
        /// Largest supported width in bits.
        max: u32,
    },

    /// A field could not be bound to a physical connection.
    #[error("cannot bind field '{field}': {source}")]
    Binding {
        /// The field that was left unbound.
        field: String,
        /// The failed connection lookup.
        #[source]
        source: UnknownConnection,
    },
}

/// Result type for peripheral operations.
pub type Result<T> = std::result::Result<T, PeripheralError>;
