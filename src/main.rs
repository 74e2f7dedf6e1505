use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use geojoin::cli::{Cli, Commands};
use geojoin::commands::{clip, count, join, run};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Clip(args) => clip::run(&cli, args),
        Commands::Count(args) => count::run(&cli, args),
        Commands::Join(args) => join::run(&cli, args),
        Commands::Run(args) => run::run(&cli, args),
    }
}
