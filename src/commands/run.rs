use anyhow::Result;

use crate::cli::{Cli, RunArgs};
use crate::pipeline::{self, PipelineConfig};

pub fn run(_cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = PipelineConfig::from_path(&args.config)?;
    let (_, report) = pipeline::run(&config)?;
    if config.output.is_none() && config.report.is_none() {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
