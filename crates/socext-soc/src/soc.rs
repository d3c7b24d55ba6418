//! The SoC description.
//!
//! A `Soc` owns its platform, an ordered set of keyed submodules, and the
//! ordered list of submodules exposed to register-map discovery. Every
//! collection is append-only: nothing registered is ever replaced, removed
//! or reordered.

use std::fmt;

use socext_core::{Csr, RegisterBank, Submodule};
use socext_platform::Platform;

use crate::csr_map::CsrMap;
use crate::error::{Result, SocError};
use crate::options::SocOptions;

/// A system-on-chip description.
pub struct Soc {
    /// Name of the target this SoC was built from.
    pub name: String,
    platform: Platform,
    options: SocOptions,
    submodules: Vec<(String, Box<dyn Submodule>)>,
    csr_regions: Vec<String>,
}

impl Soc {
    /// Create an empty SoC on `platform`.
    pub fn new(name: impl Into<String>, platform: Platform, options: SocOptions) -> Self {
        Self {
            name: name.into(),
            platform,
            options,
            submodules: Vec::new(),
            csr_regions: Vec::new(),
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn options(&self) -> &SocOptions {
        &self.options
    }

    /// Register a submodule under a unique key.
    pub fn add_submodule(
        &mut self,
        key: impl Into<String>,
        module: Box<dyn Submodule>,
    ) -> Result<()> {
        let key = key.into();
        if self.submodule(&key).is_some() {
            return Err(SocError::DuplicateKey { key });
        }
        tracing::debug!(soc = %self.name, key = %key, kind = module.kind(), "added submodule");
        self.submodules.push((key, module));
        Ok(())
    }

    pub fn submodule(&self, key: &str) -> Option<&dyn Submodule> {
        self.submodules
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, m)| &**m)
    }

    /// Submodule keys in registration order.
    pub fn submodule_keys(&self) -> Vec<&str> {
        self.submodules.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Expose a registered submodule's registers to register-map discovery.
    ///
    /// The region is only added if the map still lays out with it.
    pub fn add_csr(&mut self, key: &str) -> Result<()> {
        let module = self.submodule(key).ok_or_else(|| SocError::UnknownSubmodule {
            key: key.to_string(),
        })?;
        if module.as_register_bank().is_none() {
            return Err(SocError::NotARegisterBank {
                key: key.to_string(),
            });
        }
        if self.csr_regions.iter().any(|r| r == key) {
            return Err(SocError::DuplicateCsrRegion {
                key: key.to_string(),
            });
        }
        let banks = self
            .csr_regions
            .iter()
            .map(String::as_str)
            .chain([key])
            .filter_map(|k| self.bank(k).map(|bank| (k, bank)));
        CsrMap::build(&self.options, banks)?;
        self.csr_regions.push(key.to_string());
        Ok(())
    }

    /// Keys of the mapped register banks, in location order.
    pub fn csr_regions(&self) -> &[String] {
        &self.csr_regions
    }

    fn bank(&self, key: &str) -> Option<&dyn RegisterBank> {
        self.submodule(key).and_then(|m| m.as_register_bank())
    }

    /// A mapped register, by region key and register name.
    pub fn csr(&self, region: &str, name: &str) -> Option<&dyn Csr> {
        if !self.csr_regions.iter().any(|r| r == region) {
            return None;
        }
        self.bank(region).and_then(|b| b.csr(name))
    }

    /// Assign addresses to every mapped register.
    pub fn csr_map(&self) -> Result<CsrMap> {
        let banks = self
            .csr_regions
            .iter()
            .filter_map(|key| self.bank(key).map(|bank| (key.as_str(), bank)));
        CsrMap::build(&self.options, banks)
    }

    /// Read one bus word, as software would.
    pub fn read_csr(&self, addr: u64) -> Option<u64> {
        let map = self.csr_map().ok()?;
        let (region, entry, word) = map.decode(addr)?;
        let csr = self.csr(&region.name, &entry.register)?;
        Some(map.read_word(csr, entry.words, word))
    }

    /// Write one bus word, as software would. Returns `false` if the address
    /// decodes to nothing or to a read-only register.
    pub fn write_csr(&self, addr: u64, value: u64) -> bool {
        let Ok(map) = self.csr_map() else {
            return false;
        };
        let Some((region, entry, word)) = map.decode(addr) else {
            return false;
        };
        let Some(csr) = self.csr(&region.name, &entry.register) else {
            return false;
        };
        let shift = map.word_shift(entry.words, word);
        let mask = map.word_mask() << shift;
        let merged = (csr.read() & !mask) | ((value & map.word_mask()) << shift);
        csr.write(merged)
    }
}

impl fmt::Debug for Soc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Soc")
            .field("name", &self.name)
            .field("platform", &self.platform.name)
            .field("submodules", &self.submodule_keys())
            .field("csr_regions", &self.csr_regions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use socext_core::StorageRegister;

    use super::*;

    #[derive(Debug)]
    struct Scratch(StorageRegister);

    impl RegisterBank for Scratch {
        fn csrs(&self) -> Vec<&dyn Csr> {
            vec![&self.0 as &dyn Csr]
        }
    }

    impl Submodule for Scratch {
        fn kind(&self) -> &str {
            "scratch"
        }

        fn as_register_bank(&self) -> Option<&dyn RegisterBank> {
            Some(self)
        }
    }

    /// Two 32-bit registers, eight bytes of CSR space.
    #[derive(Debug)]
    struct Scratch2([StorageRegister; 2]);

    impl Scratch2 {
        fn new() -> Self {
            Self([
                StorageRegister::new("lo", "Low word", 32, 0),
                StorageRegister::new("hi", "High word", 32, 0),
            ])
        }
    }

    impl RegisterBank for Scratch2 {
        fn csrs(&self) -> Vec<&dyn Csr> {
            self.0.iter().map(|r| r as &dyn Csr).collect()
        }
    }

    impl Submodule for Scratch2 {
        fn kind(&self) -> &str {
            "scratch2"
        }

        fn as_register_bank(&self) -> Option<&dyn RegisterBank> {
            Some(self)
        }
    }

    #[derive(Debug)]
    struct Opaque;

    impl Submodule for Opaque {
        fn kind(&self) -> &str {
            "opaque"
        }
    }

    fn soc() -> Soc {
        Soc::new("test", Platform::new("bare", "none"), SocOptions::default())
    }

    fn scratch() -> Box<Scratch> {
        Box::new(Scratch(StorageRegister::new("value", "Scratch value", 32, 0x1234_5678)))
    }

    #[test]
    fn submodules_keep_order() {
        let mut soc = soc();
        soc.add_submodule("a", Box::new(Opaque)).unwrap();
        soc.add_submodule("b", scratch()).unwrap();
        soc.add_submodule("c", Box::new(Opaque)).unwrap();
        assert_eq!(soc.submodule_keys(), vec!["a", "b", "c"]);
        assert_eq!(soc.submodule("b").unwrap().kind(), "scratch");
        assert!(soc.submodule("d").is_none());
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut soc = soc();
        soc.add_submodule("a", Box::new(Opaque)).unwrap();
        let err = soc.add_submodule("a", scratch()).unwrap_err();
        assert!(matches!(err, SocError::DuplicateKey { ref key } if key == "a"));
        assert_eq!(soc.submodule("a").unwrap().kind(), "opaque");
    }

    #[test]
    fn add_csr_checks_submodule() {
        let mut soc = soc();
        soc.add_submodule("opaque", Box::new(Opaque)).unwrap();
        soc.add_submodule("scratch", scratch()).unwrap();

        assert!(matches!(soc.add_csr("missing"), Err(SocError::UnknownSubmodule { .. })));
        assert!(matches!(soc.add_csr("opaque"), Err(SocError::NotARegisterBank { .. })));
        soc.add_csr("scratch").unwrap();
        assert!(matches!(soc.add_csr("scratch"), Err(SocError::DuplicateCsrRegion { .. })));
        assert_eq!(soc.csr_regions(), ["scratch".to_string()]);
    }

    #[test]
    fn unmapped_bank_is_invisible() {
        let mut soc = soc();
        soc.add_submodule("scratch", scratch()).unwrap();
        assert!(soc.csr("scratch", "value").is_none());
        assert!(soc.csr_map().unwrap().regions.is_empty());
        assert_eq!(soc.read_csr(0xF000_0000), None);
    }

    #[test]
    fn bus_read_and_write() {
        let mut soc = soc();
        soc.add_submodule("scratch", scratch()).unwrap();
        soc.add_csr("scratch").unwrap();

        assert_eq!(soc.read_csr(0xF000_0000), Some(0x1234_5678));
        assert!(soc.write_csr(0xF000_0000, 0xCAFE_F00D));
        assert_eq!(soc.read_csr(0xF000_0000), Some(0xCAFE_F00D));
        assert!(!soc.write_csr(0xF000_0004, 1));
    }

    #[test]
    fn narrow_bus_write_merges_words() {
        let options = SocOptions {
            csr_data_width: 8,
            ..SocOptions::default()
        };
        let mut soc = Soc::new("narrow", Platform::new("bare", "none"), options);
        soc.add_submodule("scratch", scratch()).unwrap();
        soc.add_csr("scratch").unwrap();

        // Least significant byte is the last word.
        assert!(soc.write_csr(0xF000_000C, 0xAB));
        assert_eq!(soc.csr("scratch", "value").unwrap().read(), 0x1234_56AB);
        assert_eq!(soc.read_csr(0xF000_0000), Some(0x12));
    }

    #[test]
    fn add_csr_rejects_region_outside_page() {
        let options = SocOptions {
            csr_paging: 4,
            ..SocOptions::default()
        };
        let mut soc = Soc::new("tight", Platform::new("bare", "none"), options);
        soc.add_submodule("scratch", scratch()).unwrap();
        soc.add_submodule("pair", Box::new(Scratch2::new())).unwrap();
        soc.add_csr("scratch").unwrap();

        let err = soc.add_csr("pair").unwrap_err();
        assert!(matches!(err, SocError::CsrRegionOverflow { ref region, .. } if region == "pair"));
        assert_eq!(soc.csr_regions(), ["scratch".to_string()]);
        assert_eq!(soc.read_csr(0xF000_0000), Some(0x1234_5678));
    }
}
