//! `socext build`: compose the target, build the SoC and export its register map.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use socext_soc::Soc;

use crate::commands::{options, resolve_target, target_name};
use crate::manifest::SocextManifest;

/// Run the build.
pub fn run(
    manifest: Option<&SocextManifest>,
    target: Option<&str>,
    csr_json: Option<&Path>,
    csr_csv: Option<&Path>,
    no_extensions: bool,
) -> Result<()> {
    let name = target_name(target, manifest);
    let options = options(manifest);
    let factory = resolve_target(name, manifest, no_extensions)?;

    tracing::info!(name, "building SoC");
    let soc = factory
        .construct(&options)
        .with_context(|| format!("building target '{name}'"))?;

    print_summary(&soc)?;
    export(&soc, csr_json, csr_csv)
}

fn print_summary(soc: &Soc) -> Result<()> {
    let map = soc.csr_map()?;
    println!("=== SoC: {} ({}) ===", soc.name, soc.platform().device);
    println!(
        "Clock: {} Hz, CSR bus: {} bits @ 0x{:08X}",
        soc.options().sys_clk_freq,
        map.data_width,
        map.csr_base
    );
    println!();
    println!("--- Submodules ---");
    for key in soc.submodule_keys() {
        if let Some(module) = soc.submodule(key) {
            println!("  {key:<12} {}", module.kind());
            if let Some(doc) = module.as_documented() {
                let doc = doc.documentation();
                println!("    {}", doc.title);
                for line in doc.body.lines() {
                    println!("    {line}");
                }
            }
        }
    }
    println!();
    println!("--- CSR map ---");
    for region in &map.regions {
        println!("  {} @ 0x{:08X}", region.name, region.base);
        for entry in &region.registers {
            println!(
                "    0x{:08X} {:<24} {:>2} bit {}",
                entry.addr,
                entry.name,
                entry.width,
                entry.access.as_str()
            );
        }
    }
    Ok(())
}

/// Write the register map exports that were asked for.
fn export(soc: &Soc, csr_json: Option<&Path>, csr_csv: Option<&Path>) -> Result<()> {
    let map = soc.csr_map()?;
    if let Some(path) = csr_json {
        fs::write(path, map.to_json()?).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = csr_csv {
        fs::write(path, map.to_csv()).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
