//! Extending a base SoC with a status-register peripheral.
//!
//! Composition runs in a fixed order: the extension's connections are
//! declared on the base platform, the base target builds its SoC unchanged,
//! then the peripheral is bound through the SoC's own platform and
//! registered as a submodule and CSR region. Every failure aborts the whole
//! composition; the partially built SoC is dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use socext_core::{PeripheralConfig, StatusRegisterPeripheral};
use socext_platform::{IoDeclaration, IoStandard, Platform};

use crate::base::Target;
use crate::error::{Result, SocError};
use crate::options::SocOptions;
use crate::soc::Soc;

fn default_key() -> String {
    "buttons".to_string()
}

/// A peripheral plus the physical connections it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Extension {
    /// Submodule key and CSR region name.
    #[serde(default = "default_key")]
    pub key: String,
    /// Connections declared on the platform before the base build.
    #[serde(default)]
    pub connections: Vec<IoDeclaration>,
    pub peripheral: PeripheralConfig,
}

impl Extension {
    pub fn new(
        key: impl Into<String>,
        connections: Vec<IoDeclaration>,
        peripheral: PeripheralConfig,
    ) -> Self {
        Self {
            key: key.into(),
            connections,
            peripheral,
        }
    }

    /// The four ULX3S direction buttons as a `buttons` status register.
    pub fn ulx3s_buttons() -> Self {
        let buttons = [("UP", "R18"), ("DOWN", "V1"), ("LEFT", "U1"), ("RIGHT", "H16")];
        let connections = buttons
            .iter()
            .map(|(name, pin)| {
                IoDeclaration::new(format!("button_{name}"), 0, *pin, IoStandard::Lvcmos33)
            })
            .collect();
        let peripheral = PeripheralConfig::new(buttons.iter().map(|(name, _)| *name))
            .with_connection_prefix("button_")
            .with_register("buttons")
            .with_description("Buttons status");
        Self::new(default_key(), connections, peripheral)
    }
}

/// Append `connections` to the platform's declarations, in order.
///
/// Fails with `DuplicateConnection` if any name and index is already
/// declared or repeats within `connections`; the platform is then unchanged.
pub fn extend_connections(platform: &mut Platform, connections: &[IoDeclaration]) -> Result<()> {
    platform.add_extension(connections)?;
    Ok(())
}

/// Bind the extension's peripheral and register it on `soc`.
fn attach(soc: &mut Soc, extension: &Extension) -> Result<()> {
    if soc.submodule(&extension.key).is_some() {
        return Err(SocError::DuplicateKey {
            key: extension.key.clone(),
        });
    }
    let peripheral = StatusRegisterPeripheral::build(&extension.peripheral, soc.platform())?;
    soc.add_submodule(extension.key.clone(), Box::new(peripheral))?;
    soc.add_csr(&extension.key)?;
    tracing::info!(
        soc = %soc.name,
        key = %extension.key,
        signals = extension.peripheral.signals.len(),
        "composed status register"
    );
    Ok(())
}

/// Build `base` with `extension` added.
pub fn compose(base: &dyn Target, extension: &Extension, options: &SocOptions) -> Result<Soc> {
    options.validate()?;
    let mut platform = base.platform(options)?;
    extend_connections(&mut platform, &extension.connections)?;
    let mut soc = base.build(platform, options)?;
    attach(&mut soc, extension)?;
    Ok(soc)
}

/// A target that builds its base with extensions added. It answers to the
/// base's name, so it can replace the base in a factory registry.
pub struct Composed {
    base: Arc<dyn Target>,
    extensions: Vec<Extension>,
    description: String,
}

impl Composed {
    pub fn new(base: Arc<dyn Target>) -> Self {
        let description = base.description().to_string();
        Self {
            base,
            extensions: Vec::new(),
            description,
        }
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.description = format!("{} + {}", self.description, extension.key);
        self.extensions.push(extension);
        self
    }

    pub fn base(&self) -> &Arc<dyn Target> {
        &self.base
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }
}

impl Target for Composed {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn platform(&self, options: &SocOptions) -> Result<Platform> {
        let mut platform = self.base.platform(options)?;
        for extension in &self.extensions {
            extend_connections(&mut platform, &extension.connections)?;
        }
        Ok(platform)
    }

    fn build(&self, platform: Platform, options: &SocOptions) -> Result<Soc> {
        let mut soc = self.base.build(platform, options)?;
        for extension in &self.extensions {
            attach(&mut soc, extension)?;
        }
        Ok(soc)
    }
}

impl std::fmt::Debug for Composed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composed")
            .field("base", &self.base.name())
            .field("extensions", &self.extensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use socext_core::Csr;

    use super::*;
    use crate::base::Ulx3sTarget;

    fn buttons_soc() -> Soc {
        compose(&Ulx3sTarget, &Extension::ulx3s_buttons(), &SocOptions::default()).unwrap()
    }

    #[test]
    fn buttons_on_ulx3s() {
        let soc = buttons_soc();
        assert_eq!(soc.submodule_keys(), vec!["crg", "ctrl", "leds", "buttons"]);
        assert_eq!(soc.csr_regions().last().map(String::as_str), Some("buttons"));

        let map = soc.csr_map().unwrap();
        let entry = map.entry("buttons_buttons").unwrap();
        assert_eq!(entry.addr, 0xF000_1000);
        assert_eq!(entry.width, 4);
        let names: Vec<_> = entry.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["UP", "DOWN", "LEFT", "RIGHT"]);
    }

    #[test]
    fn extension_connections_follow_base() {
        let soc = buttons_soc();
        let names: Vec<_> = soc.platform().io().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            &names[names.len() - 4..],
            ["button_UP", "button_DOWN", "button_LEFT", "button_RIGHT"]
        );
        assert_eq!(names[0], "clk25");
    }

    #[test]
    fn extend_connections_rejects_existing_name() {
        let mut platform = Platform::ulx3s();
        let before = platform.io().to_vec();
        let err = extend_connections(
            &mut platform,
            &[IoDeclaration::new("clk25", 0, "A1", IoStandard::Lvcmos33)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("clk25"));
        assert_eq!(platform.io(), before.as_slice());
    }

    #[test]
    fn key_collision_aborts() {
        let mut extension = Extension::ulx3s_buttons();
        extension.key = "leds".into();
        let err = compose(&Ulx3sTarget, &extension, &SocOptions::default()).unwrap_err();
        assert!(matches!(err, SocError::DuplicateKey { ref key } if key == "leds"));
    }

    #[test]
    fn unbound_signal_aborts() {
        let mut extension = Extension::ulx3s_buttons();
        extension.peripheral.signals.push("FIRE1".into());
        let err = compose(&Ulx3sTarget, &extension, &SocOptions::default()).unwrap_err();
        assert!(err.to_string().contains("FIRE1"));
    }

    #[test]
    fn composed_target_keeps_base_name() {
        let composed =
            Composed::new(Arc::new(Ulx3sTarget)).with_extension(Extension::ulx3s_buttons());
        assert_eq!(composed.name(), "ulx3s");
        assert!(composed.description().ends_with("+ buttons"));

        let soc = composed.construct(&SocOptions::default()).unwrap();
        soc.platform().drive("button_RIGHT", 0, true).unwrap();
        let buttons = soc.csr("buttons", "buttons").unwrap();
        assert_eq!(buttons.read(), 0b1000);
    }

    #[test]
    fn extension_from_toml() {
        let extension: Extension = toml::from_str(
            r#"
connections = [
    { name = "sw", index = 0, pins = "E8", io-standard = "LVCMOS33" },
    { name = "sw", index = 1, pins = "D8", io-standard = "LVCMOS33" },
]

[peripheral]
signals = ["sw"]
instance = 1
"#,
        )
        .unwrap();
        assert_eq!(extension.key, "buttons");
        assert_eq!(extension.peripheral.register, "status");

        let soc = compose(&Ulx3sTarget, &extension, &SocOptions::default()).unwrap();
        soc.platform().drive("sw", 1, true).unwrap();
        assert_eq!(soc.csr("buttons", "status").unwrap().read(), 1);
        soc.platform().drive("sw", 1, false).unwrap();
        soc.platform().drive("sw", 0, true).unwrap();
        assert_eq!(soc.csr("buttons", "status").unwrap().read(), 0);
    }
}
