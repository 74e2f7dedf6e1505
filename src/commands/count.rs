use anyhow::Result;
use tracing::info;

use crate::cli::{Cli, CountArgs};
use crate::io::{csv::write_relation, fs::ensure_parent_exists};
use crate::spatial::{self, SpatialOptions};

pub fn run(_cli: &Cli, args: &CountArgs) -> Result<()> {
    let (points, polygons) = super::load_layers(&args.input, &args.name_column)?;
    let options = SpatialOptions {
        intersect: super::intersect_options(&args.input),
        multi_match: args.multi_match.into(),
    };
    let counts = spatial::count_points(&points, &polygons, &options, &args.count_column)?;

    ensure_parent_exists(&args.output)?;
    write_relation(&counts, &args.output)?;
    info!(polygons = counts.len(), points = points.len(), output = %args.output.display(), "count");
    Ok(())
}
