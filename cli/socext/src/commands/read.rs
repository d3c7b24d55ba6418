//! `socext read`: drive input pads and read a register the way software would.

use std::fmt::Write as _;

use anyhow::{anyhow, bail, Context, Result};
use socext_soc::{CsrEntry, Soc};

use crate::commands::{options, resolve_target, target_name};
use crate::manifest::SocextManifest;

/// A pad level to apply before reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    pub connection: String,
    pub index: usize,
    pub level: bool,
}

impl std::str::FromStr for Drive {
    type Err = anyhow::Error;

    /// Parse `CONN[:INDEX]=0|1`.
    fn from_str(s: &str) -> Result<Self> {
        let (lhs, level) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected CONN[:INDEX]=0|1, got '{s}'"))?;
        let level = match level.trim() {
            "0" => false,
            "1" => true,
            other => bail!("level must be 0 or 1, got '{other}'"),
        };
        let (connection, index) = match lhs.split_once(':') {
            Some((name, index)) => (
                name,
                index
                    .parse()
                    .with_context(|| format!("bad instance index in '{s}'"))?,
            ),
            None => (lhs, 0),
        };
        if connection.is_empty() {
            bail!("missing connection name in '{s}'");
        }
        Ok(Self {
            connection: connection.to_string(),
            index,
            level,
        })
    }
}

/// Run the read.
pub fn run(
    manifest: Option<&SocextManifest>,
    target: Option<&str>,
    register: &str,
    drives: &[Drive],
    no_extensions: bool,
) -> Result<()> {
    let name = target_name(target, manifest);
    let factory = resolve_target(name, manifest, no_extensions)?;
    let soc = factory
        .construct(&options(manifest))
        .with_context(|| format!("building target '{name}'"))?;

    apply(&soc, drives)?;
    let (entry, value) = read(&soc, register)?;
    print!("{}", render(&entry, value));
    Ok(())
}

/// Apply pad levels.
fn apply(soc: &Soc, drives: &[Drive]) -> Result<()> {
    for drive in drives {
        soc.platform()
            .drive(&drive.connection, drive.index, drive.level)
            .with_context(|| format!("driving {}:{}", drive.connection, drive.index))?;
        tracing::debug!(
            connection = %drive.connection,
            index = drive.index,
            level = drive.level,
            "drove pad"
        );
    }
    Ok(())
}

/// Read a register by qualified name (`buttons_buttons`) or bus address (`0xF0001000`).
///
/// Multi-word registers are assembled from their bus words.
fn read(soc: &Soc, register: &str) -> Result<(CsrEntry, u64)> {
    let map = soc.csr_map()?;
    let entry = match register.strip_prefix("0x").or_else(|| register.strip_prefix("0X")) {
        Some(hex) => {
            let addr = u64::from_str_radix(&hex.replace('_', ""), 16)
                .with_context(|| format!("bad address '{register}'"))?;
            map.decode(addr).map(|(_, entry, _)| entry)
        }
        None => map.entry(register),
    }
    .ok_or_else(|| anyhow!("no register '{register}' in the CSR map of '{}'", soc.name))?
    .clone();

    let stride = map.stride;
    let mut value = 0u64;
    for word in 0..entry.words {
        let addr = entry.addr + u64::from(word) * stride;
        let bits = soc
            .read_csr(addr)
            .ok_or_else(|| anyhow!("address 0x{addr:08X} does not decode"))?;
        value |= bits << map.word_shift(entry.words, word);
    }
    Ok((entry, value))
}

/// Register value plus one line per field with its label.
fn render(entry: &CsrEntry, value: u64) -> String {
    let mut out = format!("{} @ 0x{:08X} = 0x{value:X}\n", entry.name, entry.addr);
    for field in &entry.fields {
        let bits = field.extract(value);
        match field.label_for(bits) {
            Some(label) => {
                let _ = writeln!(out, "  {:<12} {bits} ({label})", field.name);
            }
            None => {
                let _ = writeln!(out, "  {:<12} {bits}", field.name);
            }
        }
    }
    out
}
