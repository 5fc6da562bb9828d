use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    export::{self, ExportArgs},
    gaussian::{self, CoeffsArgs, SpreadArgs},
    run::{self, RunArgs},
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "csq-sim", about = "Central spin quantum simulator CLI")]
struct Cli {
    /// Log at debug level regardless of the configured verbosity.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation named by the merged configuration files.
    Run(RunArgs),
    /// Print Gaussian coupling coefficients, optionally as a config fragment.
    GaussianCoeffs(CoeffsArgs),
    /// Sweep the Gaussian width and write the spread document.
    GaussianSpread(SpreadArgs),
    /// Flatten the series of a result document into CSV.
    Export(ExportArgs),
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// `RUST_LOG` when set, otherwise `debug` or `info`.
fn level_filter(debug: bool) -> EnvFilter {
    let fallback = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Installs the fmt subscriber behind a reloadable filter.
fn init_tracing(debug: bool) -> Option<FilterHandle> {
    let (filter, handle) = reload::Layer::new(level_filter(debug));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .ok()
        .map(|()| handle)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let handle = init_tracing(cli.verbose);
    match cli.command {
        Command::Run(args) => {
            let config = run::load(&args)?;
            if config.is_debug() && !cli.verbose {
                if let Some(handle) = &handle {
                    handle.reload(level_filter(true))?;
                }
            }
            run::run(&config)
        }
        Command::GaussianCoeffs(args) => gaussian::coeffs(&args),
        Command::GaussianSpread(args) => gaussian::spread(&args),
        Command::Export(args) => export::run(&args),
    }
}
