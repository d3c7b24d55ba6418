//! socext CLI: compose status-register peripherals onto SoC targets.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::read::Drive;
use manifest::SocextManifest;

#[derive(Parser)]
#[command(name = "socext", version, about = "Status-register peripherals for SoC targets")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a target with its extensions and export the CSR map
    Build {
        /// Target name (default: from socext.toml, else ulx3s)
        #[arg(long)]
        target: Option<String>,
        /// Write the CSR map as JSON
        #[arg(long)]
        csr_json: Option<PathBuf>,
        /// Write the CSR map as CSV
        #[arg(long)]
        csr_csv: Option<PathBuf>,
        /// Build the base target without extensions
        #[arg(long)]
        no_extensions: bool,
    },
    /// Drive input pads and read a register
    Read {
        /// Register name (e.g. buttons_buttons) or bus address (e.g. 0xF0001000)
        register: String,
        /// Target name (default: from socext.toml, else ulx3s)
        #[arg(long)]
        target: Option<String>,
        /// Pad level to apply first, CONN[:INDEX]=0|1 (repeatable)
        #[arg(long, value_name = "CONN[:INDEX]=LEVEL")]
        drive: Vec<Drive>,
        /// Read the base target without extensions
        #[arg(long)]
        no_extensions: bool,
    },
    /// Manage targets and platform files
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },
}

#[derive(Subcommand)]
enum TargetAction {
    /// List available targets
    List,
    /// Show the connections of a target's platform
    Describe {
        /// Target or platform file name
        name: String,
        /// Output format (default: human-readable, "toml" for TOML)
        #[arg(long)]
        format: Option<String>,
    },
    /// Create platforms/<name>.platform.toml from the ULX3S template
    ///
    /// Platform files can be described and validated. `build` and `read`
    /// only know the built-in targets, so a new platform file is not buildable.
    Add {
        /// Platform name
        name: String,
    },
    /// Validate a target's platform declarations
    Validate {
        /// Target or platform file name
        name: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "socext=debug" } else { "socext=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Build {
            target,
            csr_json,
            csr_csv,
            no_extensions,
        } => {
            let (manifest, _) = load_manifest_optional(&cwd)?;
            commands::build::run(
                manifest.as_ref(),
                target.as_deref(),
                csr_json.as_deref(),
                csr_csv.as_deref(),
                no_extensions,
            )
        }

        Commands::Read {
            register,
            target,
            drive,
            no_extensions,
        } => {
            let (manifest, _) = load_manifest_optional(&cwd)?;
            commands::read::run(
                manifest.as_ref(),
                target.as_deref(),
                &register,
                &drive,
                no_extensions,
            )
        }

        Commands::Target { action } => {
            let (_, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or_else(|| cwd.clone());
            match action {
                TargetAction::List => commands::target::list(Some(&project_dir)),
                TargetAction::Describe { name, format } => {
                    commands::target::describe(&name, Some(&project_dir), format.as_deref())
                }
                TargetAction::Add { name } => commands::target::add(&name, &project_dir),
                TargetAction::Validate { name } => {
                    commands::target::validate(&name, Some(&project_dir))
                }
            }
        }
    }
}

fn load_manifest_optional(cwd: &Path) -> anyhow::Result<(Option<SocextManifest>, Option<PathBuf>)> {
    match SocextManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}
