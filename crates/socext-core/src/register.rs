//! Control/status registers.
//!
//! `Csr` is the software-visible view of a register: its layout plus a
//! read (and optionally write) path. `StatusRegister` is the layout of a
//! read-only register whose value comes from bound signals;
//! `StorageRegister` holds a value written by software.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::field::{width_mask, BitField};

/// Widest register a single CSR may describe.
pub const MAX_REGISTER_WIDTH: u32 = 64;

/// Software access mode of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    #[serde(rename = "ro")]
    ReadOnly,
    #[serde(rename = "rw")]
    ReadWrite,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::ReadOnly => "ro",
            Access::ReadWrite => "rw",
        }
    }
}

/// A software-visible register.
pub trait Csr {
    /// Register name, unique within its bank.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Fields in ascending bit order.
    fn fields(&self) -> &[BitField];

    fn access(&self) -> Access;

    /// Current register value.
    fn read(&self) -> u64;

    /// Write `value` from software. Returns `false` if the register has no
    /// write path.
    fn write(&self, _value: u64) -> bool {
        false
    }

    /// Register width in bits (end of the highest field).
    fn width(&self) -> u32 {
        self.fields().iter().map(BitField::end).max().unwrap_or(0)
    }

    /// Look up a field by name.
    fn field(&self, name: &str) -> Option<&BitField> {
        self.fields().iter().find(|f| f.name == name)
    }
}

/// Layout of a read-only, multi-field status register.
///
/// Fields are packed from bit 0 upwards in declaration order with no gaps.
/// The register holds no value of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRegister {
    pub name: String,
    pub description: String,
    fields: Vec<BitField>,
}

impl StatusRegister {
    /// Create an empty status register.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    /// Append a 1-bit flag at the next free bit and return its offset.
    pub(crate) fn push_flag(&mut self, name: &str, description: String) -> u32 {
        let offset = self.width();
        self.fields.push(BitField::flag(name, offset, description));
        offset
    }

    pub fn fields(&self) -> &[BitField] {
        &self.fields
    }

    /// Field names in bit order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Total width in bits.
    pub fn width(&self) -> u32 {
        self.fields.last().map(BitField::end).unwrap_or(0)
    }
}

/// A read-write register holding a value written by software.
#[derive(Debug)]
pub struct StorageRegister {
    name: String,
    description: String,
    fields: Vec<BitField>,
    reset: u64,
    value: AtomicU64,
}

impl StorageRegister {
    /// A storage register with a single field spanning the whole register.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        width: u32,
        reset: u64,
    ) -> Self {
        let name = name.into();
        let description = description.into();
        let width = width.min(MAX_REGISTER_WIDTH);
        let field = BitField::plain(name.clone(), 0, width, description.clone());
        Self::with_fields(name, description, vec![field], reset)
    }

    /// A storage register with an explicit field layout.
    pub fn with_fields(
        name: impl Into<String>,
        description: impl Into<String>,
        fields: Vec<BitField>,
        reset: u64,
    ) -> Self {
        let width = fields.iter().map(BitField::end).max().unwrap_or(0);
        let reset = reset & width_mask(width);
        Self {
            name: name.into(),
            description: description.into(),
            fields,
            reset,
            value: AtomicU64::new(reset),
        }
    }

    /// Value after reset.
    pub fn reset_value(&self) -> u64 {
        self.reset
    }

    /// Restore the reset value.
    pub fn reset(&self) {
        self.value.store(self.reset, Ordering::Release);
    }
}

impl Csr for StorageRegister {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn fields(&self) -> &[BitField] {
        &self.fields
    }

    fn access(&self) -> Access {
        Access::ReadWrite
    }

    fn read(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    fn write(&self, value: u64) -> bool {
        self.value
            .store(value & width_mask(self.width()), Ordering::Release);
        true
    }
}
