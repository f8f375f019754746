use anyhow::Result;
use clap::Parser;

use assconv::{cli, config, pipeline};

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let cfg = config::Config::load(args.config.as_deref())?;
    config::init_tracing(&cfg.logging, args.log_level.as_deref())?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "assconv starting");

    match args.command {
        cli::Command::Convert(cmd) => pipeline::run_convert(cmd, &cfg),
        cli::Command::PrintDefaultConfig => {
            print!("{}", cfg.to_toml_pretty()?);
            Ok(())
        }
    }
}
