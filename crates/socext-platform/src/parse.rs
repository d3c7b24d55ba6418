//! TOML parsing, serialization, validation, and discovery for platform definitions.
//!
//! Platform definitions are stored as `.platform.toml` files in the `platforms/`
//! directory of a socext project. This module provides functions to load, validate,
//! serialize, and discover these files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{PlatformError, Result};
use crate::platform::Platform;

/// A validation issue found in a platform definition.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Load a platform from a `.platform.toml` file.
pub fn load_platform_toml(path: &Path) -> Result<Platform> {
    if !path.exists() {
        return Err(PlatformError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_platform_toml(&content)
}

/// Parse a platform from a TOML string.
pub fn parse_platform_toml(toml_str: &str) -> Result<Platform> {
    let platform: Platform = toml::from_str(toml_str)?;
    Ok(platform)
}

/// Serialize a platform to pretty TOML.
pub fn platform_to_toml(platform: &Platform) -> Result<String> {
    let toml_str = toml::to_string_pretty(platform)?;
    Ok(toml_str)
}

/// Validate a platform definition for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_platform(platform: &Platform) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    // 1. Named platform and device
    if platform.name.trim().is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "platform name is empty".into(),
        });
    }
    if platform.device.trim().is_empty() {
        issues.push(ValidationIssue {
            severity: "warning",
            message: format!("platform '{}' has no device part number", platform.name),
        });
    }

    // 2. Every connection has at least one pin
    for decl in platform.io() {
        if decl.pins.is_empty() {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("connection {}:{} has no pins", decl.name, decl.index),
            });
        }
    }

    // 3. A physical pin drives at most one connection
    let mut owners: HashMap<&str, (&str, usize)> = HashMap::new();
    for decl in platform.io() {
        for pin in decl.pins.locators() {
            let owner = (decl.name.as_str(), decl.index);
            if let Some((name, index)) = owners.insert(pin.as_str(), owner) {
                issues.push(ValidationIssue {
                    severity: "error",
                    message: format!(
                        "pin {pin} is assigned to both {name}:{index} and {}:{}",
                        decl.name, decl.index
                    ),
                });
            }
        }
    }

    // 4. Instance indices of a connection name start at 0 without gaps
    let mut indices: HashMap<&str, Vec<usize>> = HashMap::new();
    for decl in platform.io() {
        indices.entry(decl.name.as_str()).or_default().push(decl.index);
    }
    for (name, mut idx) in indices {
        idx.sort_unstable();
        if idx.iter().enumerate().any(|(i, &n)| i != n) {
            issues.push(ValidationIssue {
                severity: "warning",
                message: format!("connection '{name}' has non-contiguous instance indices {idx:?}"),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Generate a template `.platform.toml` for a new platform.
///
/// Seeds from the ULX3S with the given custom name.
pub fn generate_template(name: &str) -> Result<String> {
    let mut platform = Platform::ulx3s();
    platform.name = name.into();
    platform_to_toml(&platform)
}

/// Discover all `.platform.toml` files in a project's `platforms/` directory.
///
/// Returns a list of (platform_name, file_path) pairs.
pub fn discover_platforms(project_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let platforms_dir = project_dir.join("platforms");
    if !platforms_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut platforms = Vec::new();
    let entries = std::fs::read_dir(&platforms_dir)?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(name) = file_name.strip_suffix(".platform.toml") {
                platforms.push((name.to_string(), path));
            }
        }
    }
    platforms.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(platforms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{IoDeclaration, IoStandard};

    #[test]
    fn round_trip_ulx3s() {
        let original = Platform::ulx3s();
        let toml_str = platform_to_toml(&original).unwrap();
        let parsed = parse_platform_toml(&toml_str).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
name = "tiny"
device = "LFE5U-12F"

[[io]]
name = "clk"
pins = "A1"
io-standard = "LVCMOS33"

[[io]]
name = "led"
index = 0
pins = "B1"
io-standard = "LVCMOS25"

[[io]]
name = "led"
index = 1
pins = "B2"
io-standard = "LVCMOS25"
"#;
        let platform = parse_platform_toml(toml_str).unwrap();
        assert_eq!(platform.name, "tiny");
        assert_eq!(platform.io().len(), 3);
        assert_eq!(platform.lookup("led", 1).unwrap().io_standard, IoStandard::Lvcmos25);
        assert!(platform.request("clk", 0).is_ok());
    }

    #[test]
    fn parse_duplicate_connection_fails() {
        let toml_str = r#"
name = "dup"
device = "x"

[[io]]
name = "clk"
pins = "A1"
io-standard = "LVCMOS33"

[[io]]
name = "clk"
pins = "A2"
io-standard = "LVCMOS33"
"#;
        assert!(parse_platform_toml(toml_str).is_err());
    }

    #[test]
    fn parse_invalid_returns_error() {
        assert!(parse_platform_toml("this is not valid toml [[[").is_err());
    }

    #[test]
    fn parse_missing_field_returns_error() {
        assert!(parse_platform_toml("name = \"incomplete\"\n").is_err());
    }

    #[test]
    fn validate_valid_ulx3s() {
        assert!(validate_platform(&Platform::ulx3s()).is_ok());
    }

    #[test]
    fn validate_shared_pin() {
        let mut platform = Platform::ulx3s();
        platform
            .add_extension(&[IoDeclaration::new("button_UP", 0, "G2", IoStandard::Lvcmos33)])
            .unwrap();
        let issues = validate_platform(&platform).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("pin G2")));
    }

    #[test]
    fn validate_empty_pins() {
        let mut platform = Platform::new("p", "d");
        platform
            .add_extension(&[IoDeclaration::new("nc", 0, "", IoStandard::Lvcmos33)])
            .unwrap();
        let issues = validate_platform(&platform).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("no pins")));
    }

    #[test]
    fn validate_index_gap() {
        let mut platform = Platform::new("p", "d");
        platform
            .add_extension(&[IoDeclaration::new("btn", 1, "A1", IoStandard::Lvcmos33)])
            .unwrap();
        let issues = validate_platform(&platform).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("non-contiguous")));
        assert!(issues.iter().all(|i| i.severity == "warning"));
    }

    #[test]
    fn generate_template_is_valid() {
        let toml_str = generate_template("my-board").unwrap();
        let platform = parse_platform_toml(&toml_str).unwrap();
        assert_eq!(platform.name, "my-board");
        assert!(validate_platform(&platform).is_ok());
    }

    #[test]
    fn discover_platforms_finds_files() {
        let dir = tempfile::tempdir().unwrap();
        let platforms_dir = dir.path().join("platforms");
        std::fs::create_dir_all(&platforms_dir).unwrap();

        let template = generate_template("board-a").unwrap();
        std::fs::write(platforms_dir.join("board-a.platform.toml"), &template).unwrap();
        std::fs::write(platforms_dir.join("board-b.platform.toml"), &template).unwrap();
        // Non-.platform.toml file should be ignored
        std::fs::write(platforms_dir.join("notes.txt"), "ignore me").unwrap();

        let platforms = discover_platforms(dir.path()).unwrap();
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms[0].0, "board-a");
        assert_eq!(platforms[1].0, "board-b");
    }

    #[test]
    fn discover_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_platforms(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn load_not_found() {
        let result = load_platform_toml(Path::new("/nonexistent/path.platform.toml"));
        assert!(matches!(result.unwrap_err(), PlatformError::NotFound { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.platform.toml");
        std::fs::write(&path, generate_template("file-test").unwrap()).unwrap();

        let platform = load_platform_toml(&path).unwrap();
        assert_eq!(platform.name, "file-test");
    }
}
