//! Register bitfields.

use serde::{Deserialize, Serialize};

/// Label of a single-bit field when the bit reads 0.
pub const INACTIVE_LABEL: &str = "not active";
/// Label of a single-bit field when the bit reads 1.
pub const ACTIVE_LABEL: &str = "active";

/// A human-readable label for one value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueLabel {
    pub value: u64,
    pub label: String,
}

/// A named, fixed-width slice of a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    /// Field name, unique within its register.
    pub name: String,
    /// Bit position of the field's least significant bit.
    pub offset: u32,
    /// Width in bits.
    pub width: u32,
    /// Human-readable description.
    pub description: String,
    /// Labels for known values, in declaration order.
    #[serde(default)]
    pub values: Vec<ValueLabel>,
}

impl BitField {
    /// A 1-bit field labelled `0 = "not active"`, `1 = "active"`.
    pub fn flag(name: impl Into<String>, offset: u32, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset,
            width: 1,
            description: description.into(),
            values: vec![
                ValueLabel {
                    value: 0,
                    label: INACTIVE_LABEL.into(),
                },
                ValueLabel {
                    value: 1,
                    label: ACTIVE_LABEL.into(),
                },
            ],
        }
    }

    /// A field with no value labels.
    pub fn plain(
        name: impl Into<String>,
        offset: u32,
        width: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            offset,
            width,
            description: description.into(),
            values: Vec::new(),
        }
    }

    /// Mask of the field's bits within the register.
    pub fn mask(&self) -> u64 {
        width_mask(self.width) << self.offset
    }

    /// Extract this field's value from a full register value.
    pub fn extract(&self, register_value: u64) -> u64 {
        (register_value >> self.offset) & width_mask(self.width)
    }

    /// Label for `value`, if one is declared.
    pub fn label_for(&self, value: u64) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.label.as_str())
    }

    /// One past the field's most significant bit.
    pub fn end(&self) -> u32 {
        self.offset + self.width
    }
}

/// All-ones mask of `width` bits.
pub(crate) fn width_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}
