//! `socext target`: target listing, description and platform files.

use std::path::Path;

use anyhow::{bail, Context, Result};
use socext_platform::parse::{
    discover_platforms, generate_template, load_platform_toml, platform_to_toml, validate_platform,
};
use socext_platform::Platform;
use socext_soc::{default_names, resolve_default, SocOptions};

/// List the registered targets and any project platform files.
pub fn list(project_dir: Option<&Path>) -> Result<()> {
    println!("Targets:");
    println!();
    for name in default_names() {
        let target = resolve_default(&name)?;
        println!("  {name:<25} {}", target.description());
    }

    if let Some(dir) = project_dir {
        let platforms = discover_platforms(dir)?;
        if !platforms.is_empty() {
            println!();
            println!("Project platforms:");
            println!();
            for (name, path) in platforms {
                println!("  {name:<25} {}", path.display());
            }
        }
    }
    println!();
    println!("Use 'socext target describe <name>' for details.");
    Ok(())
}

/// Find a platform by name: project platform files first, then the registry.
fn find_platform(name: &str, project_dir: Option<&Path>) -> Result<(Platform, String)> {
    if let Some(dir) = project_dir {
        let found = discover_platforms(dir)?.into_iter().find(|(n, _)| n == name);
        if let Some((_, path)) = found {
            let platform = load_platform_toml(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            return Ok((platform, path.display().to_string()));
        }
    }
    let Ok(target) = resolve_default(name) else {
        bail!("unknown target: '{name}'. Use 'socext target list' to see available targets.");
    };
    let platform = target.platform(&SocOptions::default())?;
    Ok((platform, target.description().to_string()))
}

/// Describe a target's platform in detail.
pub fn describe(name: &str, project_dir: Option<&Path>, format: Option<&str>) -> Result<()> {
    let (platform, source) = find_platform(name, project_dir)?;

    if format == Some("toml") {
        print!("{}", platform_to_toml(&platform)?);
        return Ok(());
    }

    println!("=== Target: {name} ===");
    println!("Source: {source}");
    println!("Device: {}", platform.device);
    println!();
    println!("--- Connections ---");
    for decl in platform.io() {
        let connection = format!("{}:{}", decl.name, decl.index);
        println!("  {connection:<20} {:<12} {}", decl.pins.to_string(), decl.io_standard);
    }
    Ok(())
}

/// Write a new `platforms/<name>.platform.toml` seeded from the ULX3S.
///
/// The file only declares connections; `build` and `read` still resolve
/// targets through the factory registry.
pub fn add(name: &str, project_dir: &Path) -> Result<()> {
    let dir = project_dir.join("platforms");
    let path = dir.join(format!("{name}.platform.toml"));
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    std::fs::write(&path, generate_template(name)?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    println!(
        "Check it with `socext target describe {name}` or `socext target validate {name}`."
    );
    println!("Built-in targets for `build`/`read`: {}", default_names().join(", "));
    Ok(())
}

/// Validate a target's platform declarations.
pub fn validate(name: &str, project_dir: Option<&Path>) -> Result<()> {
    let (platform, _) = find_platform(name, project_dir)?;
    match validate_platform(&platform) {
        Ok(()) => {
            println!("{name}: OK ({} connections)", platform.io().len());
            Ok(())
        }
        Err(issues) => {
            for issue in &issues {
                eprintln!("{}: {}", issue.severity, issue.message);
            }
            if issues.iter().any(|i| i.severity == "error") {
                bail!("{name}: platform has errors");
            }
            Ok(())
        }
    }
}
