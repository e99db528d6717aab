//! pets — runs a `Petsfile` manifest.
//!
//! Executes the manifest in the current directory (or the one given on the
//! command line) with the `run`/`start`/`load` builtins wired to real
//! process execution and GOPATH-style remote module resolution.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use clap::Parser;
use pets_engine::Petsitter;
use pets_loader::GopathFetcher;
use pets_proc::{LocalRunner, stderr_sink, stdout_sink};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Run the manifest that describes your dev environment.
#[derive(Parser)]
#[command(name = "pets")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Manifest to execute (defaults to ./Petsfile)
    manifest: Option<PathBuf>,

    /// Run as if pets was started in DIR
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("cannot change directory to {}", dir.display()))?;
    }

    let manifest = match cli.manifest {
        Some(path) => path,
        None => Petsitter::default_manifest_path(&std::env::current_dir()?),
    };
    debug!(manifest = %manifest.display(), "starting");

    // An unconfigurable environment only matters if the manifest actually
    // imports a remote module, so defer that failure to resolution time.
    let fetcher =
        GopathFetcher::from_env().unwrap_or_else(|_| GopathFetcher::new(Vec::new()));

    let petsitter = Petsitter::new(
        Arc::new(LocalRunner::new()),
        Arc::new(fetcher),
        stdout_sink(),
        stderr_sink(),
    );

    petsitter
        .exec_file(&manifest)
        .with_context(|| format!("executing {}", manifest.display()))?;
    Ok(())
}
