//! IO declarations: the binding of a logical connection name to physical
//! pins and an electrical standard.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Electrical signaling standard of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IoStandard {
    /// 3.3 V LVCMOS.
    Lvcmos33,
    Lvcmos25,
    Lvcmos18,
    /// 3.3 V LVTTL.
    Lvttl,
    /// DDR3 SSTL, 1.5 V.
    Sstl15,
}

impl IoStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoStandard::Lvcmos33 => "LVCMOS33",
            IoStandard::Lvcmos25 => "LVCMOS25",
            IoStandard::Lvcmos18 => "LVCMOS18",
            IoStandard::Lvttl => "LVTTL",
            IoStandard::Sstl15 => "SSTL15",
        }
    }
}

impl fmt::Display for IoStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical pin locators of a connection, one per bit.
///
/// Written as a whitespace-separated string (`"R18"`, `"B2 C2 C1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pins(Vec<String>);

impl Pins {
    pub fn new(locators: &str) -> Self {
        Self(locators.split_whitespace().map(str::to_string).collect())
    }

    pub fn locators(&self) -> &[String] {
        &self.0
    }

    /// Number of bits (one per pin).
    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Pins {
    fn from(s: String) -> Self {
        Pins::new(&s)
    }
}

impl From<&str> for Pins {
    fn from(s: &str) -> Self {
        Pins::new(s)
    }
}

impl From<Pins> for String {
    fn from(p: Pins) -> Self {
        p.0.join(" ")
    }
}

impl fmt::Display for Pins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// A named physical connection: `(name, index, pins, io-standard)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IoDeclaration {
    /// Connection name (e.g. "button_UP", "user_led").
    pub name: String,
    /// Instance index; several connections may share a name.
    #[serde(default)]
    pub index: usize,
    /// Physical pin locators.
    pub pins: Pins,
    /// Electrical standard of every pin.
    pub io_standard: IoStandard,
}

impl IoDeclaration {
    pub fn new(
        name: impl Into<String>,
        index: usize,
        pins: impl Into<Pins>,
        io_standard: IoStandard,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            pins: pins.into(),
            io_standard,
        }
    }

    /// Whether this declaration is `name` at `index`.
    pub fn is(&self, name: &str, index: usize) -> bool {
        self.name == name && self.index == index
    }
}

impl fmt::Display for IoDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} pins={} io={}",
            self.name, self.index, self.pins, self.io_standard
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_split_on_whitespace() {
        let pins = Pins::new("B2 C2  C1\tD2");
        assert_eq!(pins.width(), 4);
        assert_eq!(pins.locators()[2], "C1");
        assert_eq!(pins.to_string(), "B2 C2 C1 D2");
        assert!(Pins::new("   ").is_empty());
    }

    #[test]
    fn declaration_display() {
        let io = IoDeclaration::new("button_UP", 0, "R18", IoStandard::Lvcmos33);
        assert_eq!(io.to_string(), "button_UP:0 pins=R18 io=LVCMOS33");
        assert!(io.is("button_UP", 0));
        assert!(!io.is("button_UP", 1));
    }

    #[test]
    fn declaration_from_toml() {
        let io: IoDeclaration = toml::from_str(
            r#"
name = "button_DOWN"
pins = "V1"
io-standard = "LVCMOS33"
"#,
        )
        .unwrap();
        assert_eq!(io.index, 0);
        assert_eq!(io.pins.locators(), ["V1".to_string()]);
        assert_eq!(io.io_standard, IoStandard::Lvcmos33);
    }

    #[test]
    fn unknown_io_standard_rejected() {
        let result: std::result::Result<IoDeclaration, _> = toml::from_str(
            r#"
name = "x"
pins = "A1"
io-standard = "LVDS"
"#,
        );
        assert!(result.is_err());
    }
}
