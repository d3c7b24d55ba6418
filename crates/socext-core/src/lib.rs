//! Core peripheral model for socext.
//!
//! A peripheral is built from named physical signals and exposes one or more
//! control/status registers (CSRs) to software:
//! - **Signals:** shared handles to the live level of a physical pad
//! - **Fields:** named, fixed-width slices of a register with value labels
//! - **Registers:** read-only status and read-write storage CSRs
//! - **Modules:** capability traits a SoC uses to collect submodules and
//!   discover register banks

pub mod error;
pub mod field;
pub mod module;
pub mod peripheral;
pub mod register;
pub mod signal;

pub use error::{PeripheralError, Result};
pub use field::{BitField, ValueLabel};
pub use module::{Documented, ModuleDoc, RegisterBank, Submodule};
pub use peripheral::{Binding, PeripheralConfig, StatusRegisterPeripheral};
pub use register::{Access, Csr, StatusRegister, StorageRegister, MAX_REGISTER_WIDTH};
pub use signal::{ConnectionProvider, Signal, UnknownConnection};
