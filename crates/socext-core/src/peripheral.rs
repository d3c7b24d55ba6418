//! The status-register peripheral.
//!
//! Turns an ordered list of named input signals into one read-only CSR with
//! a 1-bit field per signal. Each field is bound combinationally to its
//! signal: a read returns the pad levels at that instant, nothing is
//! latched.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use socext_core::{ConnectionProvider, Csr, PeripheralConfig, Signal};
//! use socext_core::{StatusRegisterPeripheral, UnknownConnection};
//!
//! struct Pads(HashMap<String, Signal>);
//!
//! impl ConnectionProvider for Pads {
//!     fn resolve(&self, name: &str, index: usize) -> Result<Signal, UnknownConnection> {
//!         self.0.get(name).cloned().ok_or_else(|| UnknownConnection::new(name, index))
//!     }
//! }
//!
//! let up = Signal::new("button_UP", 0);
//! let down = Signal::new("button_DOWN", 0);
//! let pads = Pads(HashMap::from([
//!     ("button_UP".to_string(), up.clone()),
//!     ("button_DOWN".to_string(), down.clone()),
//! ]));
//!
//! let config = PeripheralConfig::new(["UP", "DOWN"]).with_connection_prefix("button_");
//! let buttons = StatusRegisterPeripheral::build(&config, &pads).unwrap();
//!
//! down.set(true);
//! assert_eq!(buttons.read(), 0b10);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PeripheralError, Result};
use crate::field::BitField;
use crate::module::{Documented, ModuleDoc, RegisterBank, Submodule};
use crate::register::{Access, Csr, StatusRegister, MAX_REGISTER_WIDTH};
use crate::signal::{ConnectionProvider, Signal};

fn default_register() -> String {
    "status".to_string()
}

fn default_description() -> String {
    "Input status".to_string()
}

/// Declarative description of a status-register peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PeripheralConfig {
    /// Name of the status CSR inside the peripheral.
    #[serde(default = "default_register")]
    pub register: String,
    /// Register description.
    #[serde(default = "default_description")]
    pub description: String,
    /// Prefix joined to each signal name to form its connection name
    /// (e.g. `"button_"` binds field `UP` to connection `button_UP`).
    #[serde(default)]
    pub connection_prefix: String,
    /// Connection instance index every signal is resolved at.
    #[serde(default)]
    pub instance: usize,
    /// Signal names, lowest bit first.
    pub signals: Vec<String>,
}

impl PeripheralConfig {
    pub fn new<I, S>(signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            register: default_register(),
            description: default_description(),
            connection_prefix: String::new(),
            instance: 0,
            signals: signals.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_connection_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.connection_prefix = prefix.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_register(mut self, register: impl Into<String>) -> Self {
        self.register = register.into();
        self
    }

    pub fn with_instance(mut self, instance: usize) -> Self {
        self.instance = instance;
        self
    }

    /// Connection name a signal resolves through.
    pub fn connection_name(&self, signal: &str) -> String {
        format!("{}{}", self.connection_prefix, signal)
    }

    /// Check the signal list before any connection is resolved.
    pub fn validate(&self) -> Result<()> {
        if self.signals.is_empty() {
            return Err(PeripheralError::NoSignals);
        }
        let width = self.signals.len() as u32;
        if self.signals.len() > MAX_REGISTER_WIDTH as usize {
            return Err(PeripheralError::TooWide {
                register: self.register.clone(),
                width,
                max: MAX_REGISTER_WIDTH,
            });
        }
        let mut seen = HashSet::new();
        for name in &self.signals {
            if !seen.insert(name.as_str()) {
                return Err(PeripheralError::DuplicateSignal { name: name.clone() });
            }
        }
        Ok(())
    }
}

/// A combinational connection from a signal to one register bit.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Name of the bound field.
    pub field: String,
    /// Bit position of the field.
    pub offset: u32,
    /// The driving signal.
    pub signal: Signal,
}

impl Binding {
    /// The bit this binding contributes to the register value right now.
    pub fn bit(&self) -> u64 {
        u64::from(self.signal.level()) << self.offset
    }
}

/// A peripheral exposing the live state of a set of inputs as one
/// read-only status register.
#[derive(Debug, Clone)]
pub struct StatusRegisterPeripheral {
    register: StatusRegister,
    bindings: Vec<Binding>,
}

impl StatusRegisterPeripheral {
    /// Build the register and bind every field through `provider`.
    ///
    /// Fails without producing anything if the configuration is invalid or
    /// any signal cannot be resolved.
    pub fn build<P>(config: &PeripheralConfig, provider: &P) -> Result<Self>
    where
        P: ConnectionProvider + ?Sized,
    {
        config.validate()?;

        let mut register = StatusRegister::new(&config.register, &config.description);
        let mut bindings = Vec::with_capacity(config.signals.len());

        for name in &config.signals {
            let connection = config.connection_name(name);
            let signal = provider
                .resolve(&connection, config.instance)
                .map_err(|source| PeripheralError::Binding {
                    field: name.clone(),
                    source,
                })?;
            let offset = register.push_flag(name, format!("{name} input level"));
            tracing::debug!(field = %name, connection = %signal, offset, "bound status field");
            bindings.push(Binding {
                field: name.clone(),
                offset,
                signal,
            });
        }

        Ok(Self { register, bindings })
    }

    /// Build with default settings: no connection prefix, instance 0.
    pub fn from_names<P>(names: &[&str], provider: &P) -> Result<Self>
    where
        P: ConnectionProvider + ?Sized,
    {
        Self::build(&PeripheralConfig::new(names.iter().copied()), provider)
    }

    /// The register layout.
    pub fn register(&self) -> &StatusRegister {
        &self.register
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Current level of one field, by name.
    pub fn field_level(&self, name: &str) -> Option<bool> {
        self.bindings
            .iter()
            .find(|b| b.field == name)
            .map(|b| b.signal.level())
    }
}

impl Csr for StatusRegisterPeripheral {
    fn name(&self) -> &str {
        &self.register.name
    }

    fn description(&self) -> &str {
        &self.register.description
    }

    fn fields(&self) -> &[BitField] {
        self.register.fields()
    }

    fn access(&self) -> Access {
        Access::ReadOnly
    }

    fn read(&self) -> u64 {
        self.bindings.iter().fold(0, |value, b| value | b.bit())
    }
}

impl RegisterBank for StatusRegisterPeripheral {
    fn csrs(&self) -> Vec<&dyn Csr> {
        vec![self as &dyn Csr]
    }
}

impl Documented for StatusRegisterPeripheral {
    fn documentation(&self) -> ModuleDoc {
        let mut body = String::new();
        for field in self.register.fields() {
            body.push_str(&format!(
                "bit {}: {} ({})\n",
                field.offset, field.name, field.description
            ));
        }
        ModuleDoc {
            title: self.register.description.clone(),
            body,
        }
    }
}

impl Submodule for StatusRegisterPeripheral {
    fn kind(&self) -> &str {
        "status-register"
    }

    fn signals(&self) -> Vec<&Signal> {
        self.bindings.iter().map(|b| &b.signal).collect()
    }

    fn as_register_bank(&self) -> Option<&dyn RegisterBank> {
        Some(self)
    }

    fn as_documented(&self) -> Option<&dyn Documented> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::signal::UnknownConnection;

    /// A provider backed by a fixed set of signals, all at instance 0.
    struct Pads {
        signals: HashMap<String, Signal>,
    }

    impl Pads {
        fn new(names: &[&str]) -> Self {
            Self {
                signals: names
                    .iter()
                    .map(|n| (n.to_string(), Signal::new(*n, 0)))
                    .collect(),
            }
        }

        fn set(&self, name: &str, level: bool) {
            self.signals[name].set(level);
        }
    }

    impl ConnectionProvider for Pads {
        fn resolve(
            &self,
            name: &str,
            index: usize,
        ) -> std::result::Result<Signal, UnknownConnection> {
            match self.signals.get(name) {
                Some(sig) if index == 0 => Ok(sig.clone()),
                _ => Err(UnknownConnection::new(name, index)),
            }
        }
    }

    const DPAD: [&str; 4] = ["UP", "DOWN", "LEFT", "RIGHT"];

    #[test]
    fn four_buttons_scenario() {
        let pads = Pads::new(&DPAD);
        for (name, level) in DPAD.iter().zip([true, false, false, true]) {
            pads.set(name, level);
        }

        let p = StatusRegisterPeripheral::from_names(&DPAD, &pads).unwrap();
        assert_eq!(p.register().field_names(), DPAD.to_vec());
        assert_eq!(p.width(), 4);
        assert_eq!(p.read(), 0b1001);
        assert_eq!(p.field_level("UP"), Some(true));
        assert_eq!(p.field_level("DOWN"), Some(false));
        assert_eq!(p.field_level("LEFT"), Some(false));
        assert_eq!(p.field_level("RIGHT"), Some(true));
    }

    #[test]
    fn field_order_follows_names() {
        for n in 1..=12 {
            let names: Vec<String> = (0..n).rev().map(|i| format!("in{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let pads = Pads::new(&refs);
            let p = StatusRegisterPeripheral::from_names(&refs, &pads).unwrap();

            assert_eq!(p.register().field_names(), refs);
            for (i, field) in p.fields().iter().enumerate() {
                assert_eq!(field.offset, i as u32);
                assert_eq!(field.width, 1);
            }
        }
    }

    #[test]
    fn field_labels_and_access() {
        let pads = Pads::new(&DPAD);
        let p = StatusRegisterPeripheral::from_names(&DPAD, &pads).unwrap();
        assert_eq!(p.access(), Access::ReadOnly);
        assert!(!p.write(0xF));
        for field in p.fields() {
            assert_eq!(field.label_for(0), Some("not active"));
            assert_eq!(field.label_for(1), Some("active"));
        }
    }

    #[test]
    fn reads_follow_live_levels() {
        let pads = Pads::new(&DPAD);
        let p = StatusRegisterPeripheral::from_names(&DPAD, &pads).unwrap();
        assert_eq!(p.read(), 0);

        pads.set("LEFT", true);
        assert_eq!(p.read(), 0b0100);
        pads.set("UP", true);
        assert_eq!(p.read(), 0b0101);
        pads.set("LEFT", false);
        assert_eq!(p.read(), 0b0001);

        let up = p.field("UP").unwrap();
        assert_eq!(up.extract(p.read()), 1);
    }

    #[test]
    fn unresolvable_name_fails_whole_build() {
        let pads = Pads::new(&["UP", "DOWN", "RIGHT"]);
        let err = StatusRegisterPeripheral::from_names(&DPAD, &pads).unwrap_err();
        match err {
            PeripheralError::Binding { field, source } => {
                assert_eq!(field, "LEFT");
                assert_eq!(source, UnknownConnection::new("LEFT", 0));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn prefix_and_instance_are_applied() {
        let pads = Pads::new(&["button_UP", "button_DOWN"]);
        let config = PeripheralConfig::new(["UP", "DOWN"]).with_connection_prefix("button_");
        let p = StatusRegisterPeripheral::build(&config, &pads).unwrap();
        assert_eq!(p.bindings()[0].signal.name(), "button_UP");
        assert_eq!(p.register().field_names(), vec!["UP", "DOWN"]);

        let second = config.clone().with_instance(1);
        let err = StatusRegisterPeripheral::build(&second, &pads).unwrap_err();
        assert!(matches!(err, PeripheralError::Binding { ref field, .. } if field == "UP"));
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        let pads = Pads::new(&DPAD);
        assert_eq!(
            StatusRegisterPeripheral::from_names(&[], &pads).unwrap_err(),
            PeripheralError::NoSignals
        );
        assert_eq!(
            StatusRegisterPeripheral::from_names(&["UP", "DOWN", "UP"], &pads).unwrap_err(),
            PeripheralError::DuplicateSignal { name: "UP".into() }
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        let pads = Pads::new(&["up", "UP"]);
        let p = StatusRegisterPeripheral::from_names(&["up", "UP"], &pads).unwrap();
        assert_eq!(p.fields().len(), 2);
    }

    #[test]
    fn rejects_too_many_signals() {
        let names: Vec<String> = (0..65).map(|i| format!("s{i}")).collect();
        let config = PeripheralConfig::new(names);
        assert!(matches!(
            config.validate(),
            Err(PeripheralError::TooWide { width: 65, max: 64, .. })
        ));
    }

    #[test]
    fn capabilities_are_exposed() {
        let pads = Pads::new(&DPAD);
        let p = StatusRegisterPeripheral::from_names(&DPAD, &pads).unwrap();
        let module: &dyn Submodule = &p;
        assert_eq!(module.kind(), "status-register");
        assert_eq!(module.signals().len(), 4);

        let bank = module.as_register_bank().unwrap();
        assert_eq!(bank.csrs().len(), 1);
        assert!(bank.csr("status").is_some());

        let doc = module.as_documented().unwrap().documentation();
        assert_eq!(doc.title, "Input status");
        assert!(doc.body.contains("bit 3: RIGHT"));
    }

    #[test]
    fn config_from_toml_defaults() {
        let config: PeripheralConfig = toml::from_str(
            r#"
connection-prefix = "button_"
signals = ["UP", "DOWN"]
"#,
        )
        .unwrap();
        assert_eq!(config.register, "status");
        assert_eq!(config.description, "Input status");
        assert_eq!(config.instance, 0);
        assert_eq!(config.connection_name("UP"), "button_UP");
    }
}
