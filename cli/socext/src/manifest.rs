//! `socext.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use socext_core::PeripheralConfig;
use socext_platform::{IoDeclaration, IoStandard, Pins};
use socext_soc::{Extension, SocOptions};

/// The top-level manifest structure for a socext project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocextManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Target selection.
    #[serde(default)]
    pub target: Option<TargetConfig>,
    /// SoC construction options.
    #[serde(default)]
    pub options: SocOptions,
    /// Peripherals composed onto the target.
    #[serde(default)]
    pub extensions: Vec<ExtensionSpec>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required).
    pub name: String,
    /// Project version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Target section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Default target factory name.
    #[serde(default)]
    pub default: Option<String>,
}

fn default_key() -> String {
    "buttons".to_string()
}

/// One `[[extensions]]` entry: a status register over new input pins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionSpec {
    /// Submodule key and CSR region name.
    #[serde(default = "default_key")]
    pub key: String,
    /// Joined to each signal name to form its connection name.
    #[serde(default)]
    pub connection_prefix: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Status register name.
    #[serde(default)]
    pub register: Option<String>,
    /// Instance index of every declared connection.
    #[serde(default)]
    pub instance: usize,
    /// Signals, lowest bit first.
    pub signals: Vec<SignalSpec>,
}

/// One input signal and its physical pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SignalSpec {
    pub name: String,
    pub pins: Pins,
    #[serde(default = "default_io_standard")]
    pub io_standard: IoStandard,
}

fn default_io_standard() -> IoStandard {
    IoStandard::Lvcmos33
}

impl ExtensionSpec {
    /// The connections and peripheral this entry describes.
    pub fn to_extension(&self) -> Extension {
        let connections = self
            .signals
            .iter()
            .map(|s| {
                IoDeclaration::new(
                    format!("{}{}", self.connection_prefix, s.name),
                    self.instance,
                    s.pins.clone(),
                    s.io_standard,
                )
            })
            .collect();

        let mut peripheral = PeripheralConfig::new(self.signals.iter().map(|s| s.name.as_str()))
            .with_connection_prefix(&self.connection_prefix)
            .with_instance(self.instance);
        if let Some(description) = &self.description {
            peripheral = peripheral.with_description(description);
        }
        if let Some(register) = &self.register {
            peripheral = peripheral.with_register(register);
        }
        Extension::new(&self.key, connections, peripheral)
    }
}

impl SocextManifest {
    /// Search upward from `start_dir` for a `socext.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("socext.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: SocextManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                manifest
                    .options
                    .validate()
                    .with_context(|| format!("checking [options] in {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing socext.toml")
    }

    /// Resolve the default target name from the manifest.
    pub fn default_target(&self) -> Option<&str> {
        self.target.as_ref().and_then(|t| t.default.as_deref())
    }

    /// Every `[[extensions]]` entry, in manifest order.
    pub fn extensions(&self) -> Vec<Extension> {
        self.extensions.iter().map(ExtensionSpec::to_extension).collect()
    }

    /// Generate a starter manifest: the ULX3S with its four direction buttons.
    #[cfg(test)]
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1.0"

[target]
default = "ulx3s"

[options]
sys-clk-freq = 25000000

[[extensions]]
key = "buttons"
connection-prefix = "button_"
description = "Buttons status"
register = "buttons"
signals = [
    {{ name = "UP", pins = "R18" }},
    {{ name = "DOWN", pins = "V1" }},
    {{ name = "LEFT", pins = "U1" }},
    {{ name = "RIGHT", pins = "H16" }},
]
"#
        )
    }
}
