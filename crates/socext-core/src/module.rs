//! Capability traits for SoC submodules.
//!
//! A submodule takes part in the SoC's module tree. It may additionally be
//! a register bank (its CSRs can be discovered and mapped) and may document
//! itself. Each capability is a separate trait; a module opts in by
//! returning `Some(self)` from the matching accessor on `Submodule`.

use std::fmt;

use crate::register::Csr;
use crate::signal::Signal;

/// Free-form module documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDoc {
    pub title: String,
    pub body: String,
}

/// A module that can describe itself.
pub trait Documented {
    fn documentation(&self) -> ModuleDoc;
}

/// A module exposing control/status registers for register-map discovery.
pub trait RegisterBank {
    /// Registers in address order.
    fn csrs(&self) -> Vec<&dyn Csr>;

    fn csr(&self, name: &str) -> Option<&dyn Csr> {
        self.csrs().into_iter().find(|c| c.name() == name)
    }
}

/// A member of a SoC's submodule collection.
pub trait Submodule: fmt::Debug {
    /// Short kind tag (e.g. "status-register", "crg").
    fn kind(&self) -> &str;

    /// Physical signals this module is bound to.
    fn signals(&self) -> Vec<&Signal> {
        Vec::new()
    }

    fn as_register_bank(&self) -> Option<&dyn RegisterBank> {
        None
    }

    fn as_documented(&self) -> Option<&dyn Documented> {
        None
    }
}
