//! Platform model.
//!
//! A platform is an ordered set of IO declarations plus one simulated pad
//! per declaration. Requesting a connection returns a `Signal` sharing that
//! pad, so levels driven on the platform are seen by every bound peripheral.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use socext_core::{ConnectionProvider, Signal, UnknownConnection};

use crate::error::{PlatformError, Result};
use crate::io::{IoDeclaration, IoStandard};

/// On-disk form of a platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PlatformFile {
    name: String,
    device: String,
    #[serde(default)]
    io: Vec<IoDeclaration>,
}

/// A physical target: device plus its declared connections.
///
/// Clones share pads with the original.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "PlatformFile", into = "PlatformFile")]
pub struct Platform {
    /// Platform name (e.g. "ulx3s").
    pub name: String,
    /// FPGA device part number.
    pub device: String,
    io: Vec<IoDeclaration>,
    pads: HashMap<(String, usize), Signal>,
}

impl Platform {
    /// Create a platform with no connections.
    pub fn new(name: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device: device.into(),
            io: Vec::new(),
            pads: HashMap::new(),
        }
    }

    /// Append connection declarations, in order.
    ///
    /// Every declaration is checked first; if any `(name, index)` is already
    /// declared, or repeats within `extension`, nothing is added.
    pub fn add_extension(&mut self, extension: &[IoDeclaration]) -> Result<()> {
        for (i, decl) in extension.iter().enumerate() {
            let repeated = extension[..i].iter().any(|d| d.is(&decl.name, decl.index));
            if repeated || self.lookup(&decl.name, decl.index).is_some() {
                return Err(PlatformError::DuplicateConnection {
                    name: decl.name.clone(),
                    index: decl.index,
                });
            }
        }

        for decl in extension {
            tracing::debug!(platform = %self.name, io = %decl, "declared connection");
            self.pads.insert(
                (decl.name.clone(), decl.index),
                Signal::new(&decl.name, decl.index),
            );
            self.io.push(decl.clone());
        }
        Ok(())
    }

    /// All declarations, in declaration order.
    pub fn io(&self) -> &[IoDeclaration] {
        &self.io
    }

    /// Look up a declaration.
    pub fn lookup(&self, name: &str, index: usize) -> Option<&IoDeclaration> {
        self.io.iter().find(|d| d.is(name, index))
    }

    /// Request a connection, returning a handle onto its pad.
    pub fn request(&self, name: &str, index: usize) -> Result<Signal> {
        Ok(self.resolve(name, index)?)
    }

    /// Drive a pad to `level` (simulation stimulus).
    pub fn drive(&self, name: &str, index: usize, level: bool) -> Result<()> {
        self.request(name, index)?.set(level);
        Ok(())
    }

    /// Current level of a pad.
    pub fn level(&self, name: &str, index: usize) -> Result<bool> {
        Ok(self.request(name, index)?.level())
    }

    /// Construct the Radiona ULX3S (ECP5 LFE5U-45F) base platform.
    pub fn ulx3s() -> Self {
        let mut io = vec![
            IoDeclaration::new("clk25", 0, "G2", IoStandard::Lvcmos33),
            IoDeclaration::new("rst_n", 0, "R1", IoStandard::Lvcmos33),
        ];
        let leds = ["B2", "C2", "C1", "D2", "D1", "E2", "E1", "H3"];
        for (i, pin) in leds.iter().enumerate() {
            io.push(IoDeclaration::new("user_led", i, *pin, IoStandard::Lvcmos33));
        }
        io.push(IoDeclaration::new("serial_tx", 0, "L4", IoStandard::Lvcmos33));
        io.push(IoDeclaration::new("serial_rx", 0, "M1", IoStandard::Lvcmos33));

        let mut p = Self::new("ulx3s", "LFE5U-45F-6BG381C");
        // Built-in declarations are unique.
        for decl in io {
            p.pads
                .insert((decl.name.clone(), decl.index), Signal::new(&decl.name, decl.index));
            p.io.push(decl);
        }
        p
    }
}

impl ConnectionProvider for Platform {
    fn resolve(&self, name: &str, index: usize) -> std::result::Result<Signal, UnknownConnection> {
        self.pads
            .get(&(name.to_string(), index))
            .cloned()
            .ok_or_else(|| UnknownConnection::new(name, index))
    }
}

impl PartialEq for Platform {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.device == other.device && self.io == other.io
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("name", &self.name)
            .field("device", &self.device)
            .field("io", &self.io)
            .finish()
    }
}

impl TryFrom<PlatformFile> for Platform {
    type Error = PlatformError;

    fn try_from(file: PlatformFile) -> Result<Self> {
        let mut p = Platform::new(file.name, file.device);
        p.add_extension(&file.io)?;
        Ok(p)
    }
}

impl From<Platform> for PlatformFile {
    fn from(p: Platform) -> Self {
        PlatformFile {
            name: p.name,
            device: p.device,
            io: p.io,
        }
    }
}
