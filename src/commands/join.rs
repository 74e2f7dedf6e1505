use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{Cli, JoinArgs};
use crate::io::{csv::{read_relation, write_relation, CsvOptions, Encoding}, fs::ensure_parent_exists, shp::read_polygon_layer};
use crate::pipeline::{join_table, TableJoin};
use crate::table::{Aggregate, DuplicatePolicy};

pub fn run(_cli: &Cli, args: &JoinArgs) -> Result<()> {
    let polygons = read_polygon_layer(&args.polygons, &args.name_column, None)?;

    let csv = CsvOptions {
        encoding: if args.latin1 { Encoding::Latin1 } else { Encoding::Utf8 },
        ..Default::default()
    };
    let table = read_relation(&args.table, &csv)?;

    let join = TableJoin {
        key: args.key.clone(),
        value: args.value.clone(),
        aggregate: if args.count { Aggregate::Count } else { Aggregate::Sum },
        reconcile: args.renames.iter().cloned().collect(),
        duplicates: DuplicatePolicy::Error,
    };
    let (joined, report) = join_table(polygons.attributes(), polygons.name_column(), &table, &join)
        .with_context(|| format!("[join] Failed to join {} onto {}", args.table.display(), args.polygons.display()))?;

    ensure_parent_exists(&args.output)?;
    write_relation(&joined, &args.output)?;
    info!(
        rows = joined.len(),
        renamed = args.renames.len(),
        unmatched_before = report.unmatched_before.len(),
        output = %args.output.display(),
        "join"
    );
    Ok(())
}
