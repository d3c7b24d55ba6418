//! SoC descriptions and peripheral composition for socext.
//!
//! Builds a system-on-chip description from a target, extends it with
//! status-register peripherals, and publishes the result under the target's
//! own name so later lookups receive the extended system.
//!
//! # Architecture
//!
//! - **Soc:** ordered submodules, CSR regions and the platform they bind to
//! - **Target:** a named factory producing a platform and a SoC
//! - **Composition:** connection extension plus peripheral attachment,
//!   packaged as a drop-in `Target`
//! - **Factory registry:** name to target bindings, with a process-wide
//!   default instance
//! - **CSR map:** register-map address assignment and JSON/CSV export

pub mod base;
pub mod compose;
pub mod csr_map;
pub mod error;
pub mod factory;
pub mod options;
pub mod soc;

// Re-exports for convenience.
pub use base::{Target, Ulx3sTarget};
pub use compose::{compose, extend_connections, Composed, Extension};
pub use csr_map::{CsrEntry, CsrMap, CsrRegion};
pub use error::{Result, SocError};
pub use factory::{default_names, install_as_default_factory, resolve_default, FactoryRegistry};
pub use options::SocOptions;
pub use soc::Soc;
