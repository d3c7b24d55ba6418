//! SoC construction options.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SocError};

/// Options every target factory accepts. All fields have defaults, so a
/// factory can be invoked with none of them set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SocOptions {
    /// System clock frequency in Hz.
    pub sys_clk_freq: u64,
    /// Bus address of the first CSR region.
    pub csr_base: u64,
    /// Address span reserved for each CSR region, in bytes.
    pub csr_paging: u64,
    /// Width of one CSR bus word in bits.
    pub csr_data_width: u32,
    /// Include the user LED register bank.
    pub with_leds: bool,
}

impl Default for SocOptions {
    fn default() -> Self {
        Self {
            sys_clk_freq: 25_000_000,
            csr_base: 0xF000_0000,
            csr_paging: 0x800,
            csr_data_width: 32,
            with_leds: true,
        }
    }
}

impl SocOptions {
    /// Parse options from a TOML table; missing keys take defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let options: SocOptions = toml::from_str(toml_str)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if ![8, 16, 32, 64].contains(&self.csr_data_width) {
            return Err(SocError::InvalidOptions {
                detail: format!(
                    "csr-data-width {} is not one of 8, 16, 32, 64",
                    self.csr_data_width
                ),
            });
        }
        if !self.csr_paging.is_power_of_two() {
            return Err(SocError::InvalidOptions {
                detail: format!("csr-paging 0x{:X} is not a power of two", self.csr_paging),
            });
        }
        if self.csr_paging < self.csr_stride() {
            return Err(SocError::InvalidOptions {
                detail: format!(
                    "csr-paging 0x{:X} is smaller than one bus word (0x{:X} bytes)",
                    self.csr_paging,
                    self.csr_stride()
                ),
            });
        }
        if self.csr_base % self.csr_paging != 0 {
            return Err(SocError::InvalidOptions {
                detail: format!(
                    "csr-base 0x{:X} is not aligned to csr-paging 0x{:X}",
                    self.csr_base, self.csr_paging
                ),
            });
        }
        if self.sys_clk_freq == 0 {
            return Err(SocError::InvalidOptions {
                detail: "sys-clk-freq must be non-zero".into(),
            });
        }
        Ok(())
    }

    /// Byte distance between consecutive CSR words.
    pub fn csr_stride(&self) -> u64 {
        u64::from((self.csr_data_width / 8).max(4))
    }
}
