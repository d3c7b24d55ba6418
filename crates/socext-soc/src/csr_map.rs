//! Register-map address assignment and export.
//!
//! Every CSR region (one per register-bank submodule, in `add_csr` order)
//! gets a page of `csr_paging` bytes starting at `csr_base`. Registers are
//! packed into the page at `csr_stride` bytes per bus word. A register wider
//! than one bus word spans several words, most significant word first.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use socext_core::{Access, BitField, Csr, RegisterBank};

use crate::error::{Result, SocError};
use crate::options::SocOptions;

/// One mapped register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrEntry {
    /// Fully qualified name, `<region>_<register>`.
    pub name: String,
    /// Register name within its region.
    pub register: String,
    /// Bus address of the first (most significant) word.
    pub addr: u64,
    /// Number of bus words.
    pub words: u32,
    /// Register width in bits.
    pub width: u32,
    pub access: Access,
    pub description: String,
    pub fields: Vec<BitField>,
}

/// A mapped register bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrRegion {
    /// Submodule key.
    pub name: String,
    /// Page index.
    pub location: u32,
    /// Bus address of the page.
    pub base: u64,
    pub registers: Vec<CsrEntry>,
}

/// The exported register map of a SoC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrMap {
    pub csr_base: u64,
    pub data_width: u32,
    /// Byte distance between consecutive bus words.
    pub stride: u64,
    pub regions: Vec<CsrRegion>,
}

/// Section separator of the CSV export.
const RULE: &str =
    "#--------------------------------------------------------------------------------\n";

/// Number of bus words a register of `width` bits occupies.
fn word_count(width: u32, data_width: u32) -> u32 {
    width.div_ceil(data_width).max(1)
}

impl CsrMap {
    /// Assign addresses to `banks`, in order.
    ///
    /// Fails if a region's registers overrun its page or an address does not
    /// fit in 64 bits.
    pub fn build<'a, I>(options: &SocOptions, banks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a dyn RegisterBank)>,
    {
        let stride = options.csr_stride();
        let mut regions = Vec::new();

        for (location, (key, bank)) in banks.into_iter().enumerate() {
            let overflow = || SocError::CsrAddressOverflow {
                region: key.to_string(),
            };
            let base = (location as u64)
                .checked_mul(options.csr_paging)
                .and_then(|offset| options.csr_base.checked_add(offset))
                .ok_or_else(overflow)?;

            // Byte offset of the next free word within the page.
            let mut offset = 0u64;
            let mut registers = Vec::new();
            for csr in bank.csrs() {
                let width = csr.width();
                let words = word_count(width, options.csr_data_width);
                let addr = base.checked_add(offset).ok_or_else(overflow)?;
                registers.push(CsrEntry {
                    name: format!("{key}_{}", csr.name()),
                    register: csr.name().to_string(),
                    addr,
                    words,
                    width,
                    access: csr.access(),
                    description: csr.description().to_string(),
                    fields: csr.fields().to_vec(),
                });
                offset += u64::from(words) * stride;
            }
            if offset > options.csr_paging {
                return Err(SocError::CsrRegionOverflow {
                    region: key.to_string(),
                    size: offset,
                    paging: options.csr_paging,
                });
            }

            tracing::debug!(
                region = key,
                location,
                base = %format!("0x{base:08X}"),
                "mapped CSR region"
            );
            regions.push(CsrRegion {
                name: key.to_string(),
                location: location as u32,
                base,
                registers,
            });
        }

        Ok(Self {
            csr_base: options.csr_base,
            data_width: options.csr_data_width,
            stride,
            regions,
        })
    }

    pub fn region(&self, name: &str) -> Option<&CsrRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Look up a register by its fully qualified name.
    pub fn entry(&self, name: &str) -> Option<&CsrEntry> {
        self.entries().find(|e| e.name == name)
    }

    /// All registers, in address order.
    pub fn entries(&self) -> impl Iterator<Item = &CsrEntry> {
        self.regions.iter().flat_map(|r| r.registers.iter())
    }

    /// The region, register and word index decoded by `addr`.
    pub fn decode(&self, addr: u64) -> Option<(&CsrRegion, &CsrEntry, u32)> {
        for region in &self.regions {
            for entry in &region.registers {
                let Some(offset) = addr.checked_sub(entry.addr) else {
                    continue;
                };
                if offset < u64::from(entry.words) * self.stride && offset % self.stride == 0 {
                    return Some((region, entry, (offset / self.stride) as u32));
                }
            }
        }
        None
    }

    /// Bit shift of bus word `word` within a register of `words` words.
    pub fn word_shift(&self, words: u32, word: u32) -> u32 {
        self.data_width * (words - 1 - word)
    }

    /// Mask of one bus word.
    pub fn word_mask(&self) -> u64 {
        if self.data_width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.data_width) - 1
        }
    }

    /// Read bus word `word` of `csr`.
    pub(crate) fn read_word(&self, csr: &dyn Csr, words: u32, word: u32) -> u64 {
        (csr.read() >> self.word_shift(words, word)) & self.word_mask()
    }

    /// Pretty JSON export.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// CSV export: one `csr_base` line per region, one `csr_register` line per register.
    pub fn to_csv(&self) -> String {
        let mut out = format!("{RULE}# CSR Location\n{RULE}");
        for region in &self.regions {
            let _ = writeln!(out, "csr_base,{},0x{:08x},,", region.name, region.base);
        }
        let _ = write!(out, "{RULE}# CSR Registers\n{RULE}");
        for entry in self.entries() {
            let _ = writeln!(
                out,
                "csr_register,{},0x{:08x},{},{}",
                entry.name,
                entry.addr,
                entry.words,
                entry.access.as_str()
            );
        }
        out
    }
}
