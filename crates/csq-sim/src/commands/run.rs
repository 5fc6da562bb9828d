use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use csq_exp::{load_config, run_and_write, Config};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML configuration files, merged in order (later files win).
    #[arg(short = 'f', long = "values", required = true)]
    pub values: Vec<PathBuf>,
}

/// Loads the layered configuration without running it.
pub fn load(args: &RunArgs) -> Result<Config, Box<dyn Error>> {
    Ok(load_config(args.values.as_slice())?)
}

pub fn run(config: &Config) -> Result<(), Box<dyn Error>> {
    tracing::debug!(?config, "merged configuration");
    let path = run_and_write(config)?;
    println!("{}", path.display());
    Ok(())
}
