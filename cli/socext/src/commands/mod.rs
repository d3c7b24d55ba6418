//! CLI command implementations.

pub mod build;
pub mod read;
pub mod target;

use std::sync::Arc;

use anyhow::{Context, Result};
use socext_soc::{
    install_as_default_factory, resolve_default, Composed, Extension, SocOptions, Target,
};

use crate::manifest::SocextManifest;

/// Target used when neither the command line nor the manifest names one.
pub const DEFAULT_TARGET: &str = "ulx3s";

/// Pick the target name: command line, then manifest, then the default.
pub fn target_name<'a>(cli: Option<&'a str>, manifest: Option<&'a SocextManifest>) -> &'a str {
    cli.or_else(|| manifest.and_then(|m| m.default_target()))
        .unwrap_or(DEFAULT_TARGET)
}

/// SoC options from the manifest, or defaults.
pub fn options(manifest: Option<&SocextManifest>) -> SocOptions {
    manifest.map(|m| m.options.clone()).unwrap_or_default()
}

/// Extensions to compose onto `target`: the manifest's, or the ULX3S buttons
/// when building the ULX3S without a manifest.
pub fn extensions_for(target: &str, manifest: Option<&SocextManifest>) -> Vec<Extension> {
    match manifest {
        Some(m) => m.extensions(),
        None if target == DEFAULT_TARGET => vec![Extension::ulx3s_buttons()],
        None => Vec::new(),
    }
}

/// Wrap `base` so it builds with `extensions` added.
pub fn compose_target(base: Arc<dyn Target>, extensions: Vec<Extension>) -> Arc<dyn Target> {
    let composed = extensions
        .into_iter()
        .fold(Composed::new(base), Composed::with_extension);
    Arc::new(composed)
}

/// Install the extensions over `target` in the process-wide registry, then
/// resolve `target` through it.
pub fn resolve_target(
    target: &str,
    manifest: Option<&SocextManifest>,
    no_extensions: bool,
) -> Result<Arc<dyn Target>> {
    let base =
        resolve_default(target).context("use 'socext target list' to see available targets")?;
    let extensions = if no_extensions {
        Vec::new()
    } else {
        extensions_for(target, manifest)
    };
    if !extensions.is_empty() {
        let composed = compose_target(base.clone(), extensions);
        install_as_default_factory(base.as_ref(), composed)
            .with_context(|| format!("installing extensions over '{target}'"))?;
    }
    Ok(resolve_default(target)?)
}

#[cfg(test)]
mod tests {
    use socext_soc::Ulx3sTarget;

    use super::*;

    #[test]
    fn target_name_precedence() {
        let manifest =
            SocextManifest::from_str("[project]\nname = \"p\"\n[target]\ndefault = \"pair\"\n")
                .unwrap();
        assert_eq!(target_name(Some("cli"), Some(&manifest)), "cli");
        assert_eq!(target_name(None, Some(&manifest)), "pair");
        assert_eq!(target_name(None, None), "ulx3s");
    }

    #[test]
    fn builtin_buttons_without_manifest() {
        assert_eq!(extensions_for("ulx3s", None), vec![Extension::ulx3s_buttons()]);
        assert!(extensions_for("other", None).is_empty());

        let manifest = SocextManifest::from_str("[project]\nname = \"p\"\n").unwrap();
        assert!(extensions_for("ulx3s", Some(&manifest)).is_empty());
    }

    #[test]
    fn composed_target_answers_to_base_name() {
        let target = compose_target(Arc::new(Ulx3sTarget), extensions_for("ulx3s", None));
        assert_eq!(target.name(), "ulx3s");
        let soc = target.construct(&SocOptions::default()).unwrap();
        assert_eq!(soc.submodule_keys(), vec!["crg", "ctrl", "leds", "buttons"]);
    }
}
